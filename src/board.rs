//! Board-specific definitions
//!
//! The pad is hand wired to a SparkFun Pro Micro RP2040.  The matrix columns
//! are driven high one at a time and the rows are read back through
//! pull-downs.  The encoders and their push switches are read through
//! pull-ups.

pub const NCOLS: usize = macropad_keyboard::COLS;
pub const NROWS: usize = macropad_keyboard::ROWS;
pub const NKEYS: usize = NCOLS * NROWS;

// pid.codes test VID/PID.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;
pub const USB_MANUFACTURER: &str = "macropad";
pub const USB_PRODUCT: &str = "Ortho 4x4 Macropad";
pub const USB_SERIAL: &str = "development";

macro_rules! col_pins {
    ($pins:expr, $($pin:ident),*) => {
        [
            $($pins.$pin
              .into_push_pull_output_in_state($crate::bsp::hal::gpio::PinState::Low)
              .into_dyn_pin()),*
        ]
    };
}
pub(crate) use col_pins;

macro_rules! row_pins {
    ($pins:expr, $($pin:ident),*) => {
        [
            $($pins.$pin
              .into_pull_down_input()
              .into_dyn_pin()),*
        ]
    };
}
pub(crate) use row_pins;

macro_rules! pull_up_pins {
    ($pins:expr, $($pin:ident),*) => {
        [
            $($pins.$pin
              .into_pull_up_input()
              .into_dyn_pin()),*
        ]
    };
}
pub(crate) use pull_up_pins;

macro_rules! cols {
    ($pins:expr) => {
        $crate::board::col_pins!($pins, gpio2, gpio3, gpio4, gpio5)
    };
}
pub(crate) use cols;

macro_rules! rows {
    ($pins:expr) => {
        $crate::board::row_pins!($pins, gpio6, gpio7, tx1, rx1)
    };
}
pub(crate) use rows;

/// A and B for each encoder, left one first.
macro_rules! encoders {
    ($pins:expr) => {{
        let [a0, b0, a1, b1] = $crate::board::pull_up_pins!($pins, adc0, adc1, adc2, adc3);
        [(a0, b0), (a1, b1)]
    }};
}
pub(crate) use encoders;

/// The encoder push switches, in the same order as the encoders.
macro_rules! aux {
    ($pins:expr) => {
        $crate::board::pull_up_pins!($pins, tx0, sck)
    };
}
pub(crate) use aux;
