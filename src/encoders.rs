//! Rotary encoders.

use core::convert::Infallible;

use embedded_hal::digital::v2::InputPin;
use macropad_keyboard::encoder::Quadrature;
use macropad_keyboard::{Event, EventQueue};

pub struct Encoders<P, const N: usize> {
    /// The A and B pins of each encoder.
    pins: [(P, P); N],
    decoders: [Quadrature; N],
}

impl<P: InputPin<Error = Infallible>, const N: usize> Encoders<P, N> {
    pub fn new(pins: [(P, P); N]) -> Self {
        Encoders {
            pins,
            decoders: core::array::from_fn(|_| Quadrature::new()),
        }
    }

    /// Sample every encoder, queueing an event for each detent.
    pub fn tick(&mut self, events: &mut dyn EventQueue) {
        for (index, ((a, b), decoder)) in self.pins.iter().zip(self.decoders.iter_mut()).enumerate() {
            let a = a.is_high().unwrap_or(true);
            let b = b.is_high().unwrap_or(true);
            if let Some(dir) = decoder.update(a, b) {
                events.push(Event::Encoder {
                    index: index as u8,
                    clockwise: dir.is_clockwise(),
                });
            }
        }
    }
}
