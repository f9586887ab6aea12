//! Macropad keyboard support
//!
//! Keymaps and event translation for a 4x4 ortholinear macropad with two
//! rotary encoders and two extra buttons wired to their own pins.  Nothing in
//! here touches hardware: the firmware scans the matrix, decodes the encoders,
//! samples the button pins, and feeds the results in.  What comes back out are
//! [`Event`]s, mostly [`KeyAction`]s to be turned into HID reports.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(not(any(feature = "std", test)))]
extern crate core as std;

use bitflags::bitflags;
use usb_device::prelude::UsbDeviceState;

pub use usbd_human_interface_device::page::{Consumer, Keyboard};

pub use keycodes::{Code, Custom, Key};
pub use layout::{Keymap, LayerState, LayoutManager, Process};

pub mod buttons;
pub mod encoder;
pub mod keycodes;
pub mod layout;

mod log {
    cfg_if::cfg_if! {
        if #[cfg(feature = "defmt")] {
            pub(crate) use defmt::{debug, info, warn};
        } else if #[cfg(feature = "log")] {
            pub(crate) use ::log::{debug, info, warn};
        } else {
            macro_rules! discard {
                ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
            }
            pub(crate) use discard as debug;
            pub(crate) use discard as info;
            pub(crate) use discard as warn;
        }
    }
}

/// Rows in the key matrix.
pub const ROWS: usize = 4;

/// Columns in the key matrix.
pub const COLS: usize = 4;

/// All of the scan codes fit within this.
pub const NKEYS: usize = ROWS * COLS;

/// Rotary encoders on the board.
pub const NUM_ENCODERS: usize = 2;

/// Buttons wired directly to pins, outside of the matrix.
pub const NUM_AUX: usize = 2;

/// The scan code for a given matrix position.
///
/// The matrix is driven a column at a time, with the rows read back, so codes
/// run down each column before moving to the next.
pub const fn scan_code(row: usize, col: usize) -> u8 {
    (col * ROWS + row) as u8
}

/// Key events indicate keys going up or down.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum KeyEvent {
    Press(u8),
    Release(u8),
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            KeyEvent::Press(k) => defmt::write!(fmt, "KeyEvent::Press({})", k),
            KeyEvent::Release(k) => defmt::write!(fmt, "KeyEvent::Release({})", k),
        }
    }
}

impl KeyEvent {
    pub fn key(&self) -> u8 {
        match self {
            KeyEvent::Press(k) => *k,
            KeyEvent::Release(k) => *k,
        }
    }

    pub fn is_press(&self) -> bool {
        match self {
            KeyEvent::Press(_) => true,
            KeyEvent::Release(_) => false,
        }
    }

    /// The `(row, col)` this event came from, if the scan code is on the
    /// matrix.
    pub fn position(&self) -> Option<(usize, usize)> {
        let code = self.key() as usize;
        if code < NKEYS {
            Some((code % ROWS, code / ROWS))
        } else {
            None
        }
    }
}

/// The primitive operations a key handler can ask of the host.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Hold the code down until a matching `Unregister`.
    Register(Code),
    /// Let go of a held code.
    Unregister(Code),
    /// Press and immediately release.
    Tap(Code),
}

bitflags! {
    /// A modifier map. This indicates what modifiers should be held down
    /// around a keypress.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
    pub struct Mods: u8 {
        const SHIFT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const GUI = 0b0000_1000;
    }
}

/// Modifiers in the order they go down.  They come back up in reverse.
static MOD_KEYS: [(Mods, Keyboard); 4] = [
    (Mods::GUI, Keyboard::LeftGUI),
    (Mods::CONTROL, Keyboard::LeftControl),
    (Mods::ALT, Keyboard::LeftAlt),
    (Mods::SHIFT, Keyboard::LeftShift),
];

impl Mods {
    /// The left-hand modifier keys for this map, in press order.
    pub fn keys(self) -> impl DoubleEndedIterator<Item = Keyboard> {
        MOD_KEYS
            .iter()
            .filter(move |(m, _)| self.contains(*m))
            .map(|(_, k)| *k)
    }
}

/// Send `key` with `mods` held: register each modifier, tap the key, then
/// unregister the modifiers in reverse.
pub fn chord(mods: Mods, key: Keyboard, events: &mut dyn EventQueue) {
    for m in mods.keys() {
        events.push(Event::Key(KeyAction::Register(Code::Key(m))));
    }
    events.push(Event::Key(KeyAction::Tap(Code::Key(key))));
    for m in mods.keys().rev() {
        events.push(Event::Key(KeyAction::Unregister(Code::Key(m))));
    }
}

/// An event is something that happens in a handler to indicate some action
/// likely needs to be performed on it.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Event {
    /// Events from the Matrix layer indicating changes in key actions.
    Matrix(KeyEvent),

    /// One detent of a rotary encoder.
    Encoder { index: u8, clockwise: bool },

    /// Something that should be sent to the host.
    Key(KeyAction),

    /// The set of active layers changed.
    Layer(LayerState),

    /// Change in USB status.
    UsbState(UsbDeviceState),
}

/// A generalized event queue.
pub trait EventQueue {
    /// Attempt to push to the queue.  Events will be discarded if the queue is
    /// full.
    fn push(&mut self, val: Event);
}

/// Things that can go wrong when addressing parts of a keymap.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The keymap has no layer with this index.
    NoSuchLayer(u8),
    /// The board has no encoder with this index.
    NoSuchEncoder(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<Event>);

    impl EventQueue for Recorder {
        fn push(&mut self, val: Event) {
            self.0.push(val);
        }
    }

    fn key(action: fn(Code) -> KeyAction, k: Keyboard) -> Event {
        Event::Key(action(Code::Key(k)))
    }

    #[test]
    fn chord_nests_modifiers() {
        let mut rec = Recorder(Vec::new());
        chord(Mods::SHIFT | Mods::GUI, Keyboard::A, &mut rec);
        assert_eq!(
            rec.0,
            [
                key(KeyAction::Register, Keyboard::LeftGUI),
                key(KeyAction::Register, Keyboard::LeftShift),
                key(KeyAction::Tap, Keyboard::A),
                key(KeyAction::Unregister, Keyboard::LeftShift),
                key(KeyAction::Unregister, Keyboard::LeftGUI),
            ]
        );
    }

    #[test]
    fn chord_without_mods_is_a_tap() {
        let mut rec = Recorder(Vec::new());
        chord(Mods::empty(), Keyboard::F5, &mut rec);
        assert_eq!(rec.0, [key(KeyAction::Tap, Keyboard::F5)]);
    }

    #[test]
    fn positions() {
        assert_eq!(KeyEvent::Press(scan_code(2, 3)).position(), Some((2, 3)));
        assert_eq!(KeyEvent::Release(scan_code(0, 0)).position(), Some((0, 0)));
        assert_eq!(KeyEvent::Press(NKEYS as u8).position(), None);
    }
}
