//! Auxiliary buttons
//!
//! The encoder push switches are not part of the matrix.  Each one sits on its
//! own pin with the pull-up enabled, so it reads high at rest and low while
//! held.  They are sampled on every scan tick with no debouncing; a press is a
//! high reading followed by a low one.

/// Edge tracking for buttons read straight off their pins.
pub struct AuxButtons<const N: usize> {
    /// Level seen on the previous poll.  Starts low, so a button already held
    /// at power up does nothing until it has been let go.
    last: [bool; N],
}

impl<const N: usize> Default for AuxButtons<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AuxButtons<N> {
    pub const fn new() -> Self {
        AuxButtons { last: [false; N] }
    }

    /// Take a new sample of the pin levels, returning which buttons went from
    /// high to low since the last sample.
    pub fn poll(&mut self, levels: [bool; N]) -> [bool; N] {
        let mut pressed = [false; N];
        for ((last, level), hit) in self.last.iter_mut().zip(levels).zip(pressed.iter_mut()) {
            *hit = *last && !level;
            *last = level;
        }
        pressed
    }
}

#[cfg(test)]
mod tests {
    use super::AuxButtons;

    #[test]
    fn falling_edge_only() {
        let mut aux = AuxButtons::<2>::new();
        assert_eq!(aux.poll([true, true]), [false, false]);
        assert_eq!(aux.poll([false, true]), [true, false]);
        // Still held.
        assert_eq!(aux.poll([false, true]), [false, false]);
        // Released, then the other one.
        assert_eq!(aux.poll([true, false]), [false, true]);
        assert_eq!(aux.poll([true, true]), [false, false]);
    }

    #[test]
    fn held_at_startup() {
        let mut aux = AuxButtons::<1>::new();
        assert_eq!(aux.poll([false]), [false]);
        assert_eq!(aux.poll([false]), [false]);
        assert_eq!(aux.poll([true]), [false]);
        assert_eq!(aux.poll([false]), [true]);
    }
}
