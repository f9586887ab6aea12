//! Rotary encoder decoding.
//!
//! The encoders are plain two-pin quadrature devices.  Each sample of the A and
//! B pins is combined with the previous sample to index a transition table,
//! giving +1, -1, or 0 (no change, or a skipped state).  Once enough steps in
//! one direction have accumulated, that is one detent.

/// Which way a detent went.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn is_clockwise(self) -> bool {
        self == Direction::Clockwise
    }
}

/// Indexed by `previous << 2 | current`, where each state is `b << 1 | a`.
const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Steps per detent on the usual EC11 style parts.
pub const DEFAULT_RESOLUTION: u8 = 4;

pub struct Quadrature {
    state: u8,
    pulses: i8,
    resolution: i8,
}

impl Default for Quadrature {
    fn default() -> Self {
        Self::new()
    }
}

impl Quadrature {
    pub const fn new() -> Self {
        Self::with_resolution(DEFAULT_RESOLUTION)
    }

    /// Steps per detent, clamped to `1..=i8::MAX`.
    pub const fn with_resolution(resolution: u8) -> Self {
        let resolution = if resolution == 0 {
            1
        } else if resolution > i8::MAX as u8 {
            i8::MAX as u8
        } else {
            resolution
        };
        Quadrature {
            // The pins are pulled up, so this is where a resting encoder sits.
            state: 0b11,
            pulses: 0,
            resolution: resolution as i8,
        }
    }

    /// Feed in the current pin levels.  Returns a direction once a full detent
    /// has been seen.
    pub fn update(&mut self, a: bool, b: bool) -> Option<Direction> {
        let current = (a as u8) | ((b as u8) << 1);
        let index = (self.state << 2) | current;
        self.state = current;

        self.pulses += TRANSITIONS[index as usize];
        if self.pulses >= self.resolution {
            self.pulses = 0;
            Some(Direction::Clockwise)
        } else if self.pulses <= -self.resolution {
            self.pulses = 0;
            Some(Direction::CounterClockwise)
        } else {
            None
        }
    }
}
