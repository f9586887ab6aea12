//! Control of the LEDs.
//!
//! The Pro Micro has a single WS2812 on board.  It shows a short color cycle
//! at power up, then a steady color for the topmost active layer.  While the
//! host has the bus suspended it is turned off.

use core::iter::once;

use smart_leds::{SmartLedsWrite, RGB8};

const OFF: RGB8 = RGB8::new(0, 0, 0);

struct Step {
    color: RGB8,
    count: usize,
}

static INIT_INDICATOR: &[Step] = &[
    Step { color: RGB8::new(8, 0, 0), count: 100 },
    Step { color: RGB8::new(0, 8, 0), count: 100 },
    Step { color: RGB8::new(0, 0, 8), count: 100 },
    Step { color: OFF,                count: 100 },
];

/// Unconfigured, waiting on the host.
static UNCONFIGURED_INDICATOR: &[Step] = &[
    Step { color: RGB8::new(8, 8, 0), count: 250 },
    Step { color: OFF,                count: 250 },
];

static SLEEP_INDICATOR: &[Step] = &[
    Step { color: OFF, count: 10_000 },
];

/// One steady color per layer, lowest first.  Higher layers wrap around.
static LAYER_INDICATORS: &[&[Step]] = &[
    &[Step { color: RGB8::new(0, 0, 6), count: 10_000 }],
    &[Step { color: RGB8::new(0, 8, 2), count: 10_000 }],
    &[Step { color: RGB8::new(8, 0, 6), count: 10_000 }],
    &[Step { color: RGB8::new(8, 4, 0), count: 10_000 }],
];

pub struct LedManager<L: SmartLedsWrite<Color = RGB8>> {
    leds: L,

    /// The indicator to show once `steps` runs out.
    base: &'static [Step],

    steps: &'static [Step],
    count: usize,
    phase: usize,
}

impl<L: SmartLedsWrite<Color = RGB8>> LedManager<L> {
    pub fn new(leds: L) -> Self {
        LedManager {
            leds,
            base: UNCONFIGURED_INDICATOR,
            steps: INIT_INDICATOR,
            count: 0,
            phase: 0,
        }
    }

    /// Show the indicator for `layer`.
    pub fn set_layer(&mut self, layer: u8) {
        let steps = LAYER_INDICATORS[layer as usize % LAYER_INDICATORS.len()];
        self.set_base(steps);
    }

    /// The host has gone to sleep.
    pub fn set_sleep(&mut self) {
        self.set_base(SLEEP_INDICATOR);
    }

    fn set_base(&mut self, steps: &'static [Step]) {
        // Let the power up cycle finish before switching.
        let booting = core::ptr::eq(self.steps, INIT_INDICATOR);
        self.base = steps;
        if !booting {
            self.restart(steps);
        }
    }

    fn restart(&mut self, steps: &'static [Step]) {
        self.steps = steps;
        self.count = 0;
        self.phase = 0;
    }

    pub fn tick(&mut self) {
        if self.count > 0 {
            self.count -= 1;
            return;
        }

        if self.phase >= self.steps.len() {
            if core::ptr::eq(self.steps, INIT_INDICATOR) {
                self.steps = self.base;
            }
            self.phase = 0;
        }

        let _ = self.leds.write(once(self.steps[self.phase].color));
        self.count = self.steps[self.phase].count;
        self.phase += 1;
    }
}
