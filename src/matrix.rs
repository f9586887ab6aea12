//! Keyboard matrix handling.

use core::convert::Infallible;

use cortex_m::delay::Delay;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use macropad_keyboard::{Event, EventQueue, KeyEvent};

pub struct Matrix<I, O, const NCOLS: usize, const NROWS: usize, const NKEYS: usize> {
    cols: [O; NCOLS],
    rows: [I; NROWS],
    keys: [Debouncer; NKEYS],
}

impl<I, O, const NCOLS: usize, const NROWS: usize, const NKEYS: usize>
    Matrix<I, O, NCOLS, NROWS, NKEYS>
where
    I: InputPin<Error = Infallible>,
    O: OutputPin<Error = Infallible>,
{
    pub fn new(cols: [O; NCOLS], rows: [I; NROWS]) -> Self {
        debug_assert_eq!(NCOLS * NROWS, NKEYS);
        Matrix {
            cols,
            rows,
            keys: [Debouncer::new(); NKEYS],
        }
    }

    /// Perform a single scan of the matrix, queueing an event for every key
    /// that changes.
    pub fn tick(&mut self, delay: &mut Delay, events: &mut dyn EventQueue) {
        for (c, col) in self.cols.iter_mut().enumerate() {
            let _ = col.set_high();
            for (r, row) in self.rows.iter().enumerate() {
                let code = c * NROWS + r;
                let level = row.is_high().unwrap_or(false);
                match self.keys[code].react(level) {
                    Some(true) => events.push(Event::Matrix(KeyEvent::Press(code as u8))),
                    Some(false) => events.push(Event::Matrix(KeyEvent::Release(code as u8))),
                    None => (),
                }
            }
            let _ = col.set_low();
            delay.delay_us(5);
        }
    }
}

/// Scans a key must read the same before a change is believed.
const DEBOUNCE_COUNT: usize = 20;

// Don't really want Copy, but needed for init.
#[derive(Clone, Copy)]
struct Debouncer {
    /// The settled state of the key.
    pressed: bool,
    /// Set when the raw reading disagrees with `pressed`.
    settling: bool,
    /// Count how many consecutive scans have disagreed.
    counter: usize,
}

impl Debouncer {
    const fn new() -> Debouncer {
        Debouncer {
            pressed: false,
            settling: false,
            counter: 0,
        }
    }

    /// Feed in a raw reading, returning the new state once it has settled.
    fn react(&mut self, level: bool) -> Option<bool> {
        if level == self.pressed {
            // Any agreeing reading starts the count over.
            self.settling = false;
            return None;
        }

        if !self.settling {
            self.settling = true;
            self.counter = 0;
        }

        self.counter += 1;
        if self.counter == DEBOUNCE_COUNT {
            self.pressed = level;
            self.settling = false;
            Some(level)
        } else {
            None
        }
    }
}
