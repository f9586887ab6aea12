//! Handle layout related concerns, such as:
//!
//! - Which layers are active, and what key that makes each position.
//! - Handing key transitions to the keymap's own record handler.
//! - The default behavior for everything the keymap doesn't handle.
//! - Encoder detents and the extra buttons, which tap keys from their own
//!   tables.

use crate::buttons::AuxButtons;
use crate::log::{debug, info, warn};
use crate::{
    Error, Event, EventQueue, Key, KeyAction, KeyEvent, COLS, NKEYS, NUM_AUX, NUM_ENCODERS, ROWS,
};

pub mod default;
pub mod pc;

/// One layer of the key matrix.
pub type Layer = [[Key; COLS]; ROWS];

/// The encoder bindings for one layer, indexed by encoder and then by
/// direction ([`CCW`] or [`CW`]).
pub type EncoderLayer = [[Key; 2]; NUM_ENCODERS];

/// Index of the counter-clockwise binding in an [`EncoderLayer`] entry.
pub const CCW: usize = 0;

/// Index of the clockwise binding in an [`EncoderLayer`] entry.
pub const CW: usize = 1;

/// Layers are tracked in a u8 bitmask.
pub const MAX_LAYERS: usize = 8;

/// What should happen after a keymap's handler has seen an event.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Process {
    /// Carry on with the default behavior for the key.
    Continue,
    /// The handler took care of it.
    Handled,
}

/// A keymap: the static tables and the handlers that go with them.
pub trait Keymap {
    const NAME: &'static str;

    /// The layer tables, lowest first.  Layer 0 is always active.
    fn layers(&self) -> &'static [Layer];

    /// The encoder tables, in the same order as the layers.  A keymap may
    /// have fewer of these than layers; the missing ones act as all
    /// transparent.
    fn encoders(&self) -> &'static [EncoderLayer];

    /// What each auxiliary button taps.
    fn aux_buttons(&self) -> [Key; NUM_AUX];

    /// Called for every key transition, with the key the active layers
    /// resolve to.
    fn process_record(&mut self, key: Key, pressed: bool, events: &mut dyn EventQueue) -> Process;

    /// Called for every encoder detent before the encoder table is
    /// consulted.
    fn encoder_update(&mut self, index: u8, clockwise: bool, events: &mut dyn EventQueue) -> Process {
        let _ = (index, clockwise, events);
        Process::Continue
    }
}

/// The set of active layers.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerState(u8);

impl Default for LayerState {
    fn default() -> Self {
        LayerState(1)
    }
}

impl LayerState {
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_active(self, layer: u8) -> bool {
        (layer as usize) < MAX_LAYERS && self.0 & (1 << layer) != 0
    }

    /// The highest layer that is turned on.
    pub fn highest(self) -> u8 {
        (u8::BITS - 1 - self.0.leading_zeros()) as u8
    }

    /// Flip a layer, out of `count` available.  The base layer can't be
    /// turned off, so toggling it does nothing.
    pub fn toggle(&mut self, layer: u8, count: usize) -> Result<(), Error> {
        if layer as usize >= count.min(MAX_LAYERS) {
            return Err(Error::NoSuchLayer(layer));
        }
        if layer != 0 {
            self.0 ^= 1 << layer;
        }
        Ok(())
    }

    /// Active layers, highest first.
    fn active(self) -> impl Iterator<Item = usize> {
        (0..MAX_LAYERS).rev().filter(move |&l| self.is_active(l as u8))
    }
}

/// The layout manager.
pub struct LayoutManager<K: Keymap> {
    keymap: K,

    layers: LayerState,

    /// For each scan code that is currently down, the key it resolved to when
    /// it was pressed.  The release goes to the same key, even if the layers
    /// have changed in between.
    down: [Option<Key>; NKEYS],

    aux: AuxButtons<NUM_AUX>,
}

impl<K: Keymap> LayoutManager<K> {
    pub fn new(keymap: K) -> Self {
        info!("Keymap: {}, {} layers", K::NAME, keymap.layers().len());
        LayoutManager {
            keymap,
            layers: LayerState::default(),
            down: [None; NKEYS],
            aux: AuxButtons::new(),
        }
    }

    pub fn keymap(&self) -> &K {
        &self.keymap
    }

    pub fn layers(&self) -> LayerState {
        self.layers
    }

    /// The key at a position, given the layers that are currently on.
    /// `None` if the position is off the matrix.
    pub fn lookup(&self, row: usize, col: usize) -> Option<Key> {
        if row >= ROWS || col >= COLS {
            return None;
        }
        let layers = self.keymap.layers();
        let key = self
            .layers
            .active()
            .filter_map(|l| layers.get(l))
            .map(|layer| layer[row][col])
            .find(|&k| k != Key::Trans);
        Some(key.unwrap_or(Key::No))
    }

    /// The key an encoder detent taps, given the layers that are on.
    /// `None` if there is no such encoder.
    pub fn encoder_lookup(&self, index: usize, clockwise: bool) -> Option<Key> {
        if index >= NUM_ENCODERS {
            return None;
        }
        let dir = if clockwise { CW } else { CCW };
        let encoders = self.keymap.encoders();
        let key = self
            .layers
            .active()
            .filter_map(|l| encoders.get(l))
            .map(|layer| layer[index][dir])
            .find(|&k| k != Key::Trans);
        Some(key.unwrap_or(Key::No))
    }

    /// Handle a single key event.
    pub fn handle_event(&mut self, event: KeyEvent, events: &mut dyn EventQueue) {
        let Some((row, col)) = event.position() else {
            warn!("Scan code out of range: {}", event.key());
            return;
        };
        let code = event.key() as usize;

        let key = if event.is_press() {
            let key = self.lookup(row, col).unwrap_or(Key::No);
            self.down[code] = Some(key);
            key
        } else {
            match self.down[code].take() {
                Some(key) => key,
                None => {
                    warn!("Release without press: {}", code);
                    return;
                }
            }
        };
        debug!("{:?} at ({}, {}) -> {:?}", event, row, col, key);

        self.process(key, event.is_press(), events);
    }

    /// One encoder detent.
    pub fn encoder_update(&mut self, index: u8, clockwise: bool, events: &mut dyn EventQueue) {
        info!("encoder update: index={}, clockwise={}", index, clockwise);
        if index as usize >= NUM_ENCODERS {
            warn!("{:?}", Error::NoSuchEncoder(index));
            return;
        }

        if self.keymap.encoder_update(index, clockwise, events) == Process::Handled {
            return;
        }

        if let Some(key) = self.encoder_lookup(index as usize, clockwise) {
            self.tap(key, events);
        }
    }

    /// Sample the auxiliary buttons.  Meant to be called every scan tick with
    /// the raw pin levels.
    pub fn poll_aux(&mut self, levels: [bool; NUM_AUX], events: &mut dyn EventQueue) {
        let pressed = self.aux.poll(levels);
        let keys = self.keymap.aux_buttons();
        for (key, _) in keys.into_iter().zip(pressed).filter(|(_, hit)| *hit) {
            debug!("aux button: {:?}", key);
            self.tap(key, events);
        }
    }

    /// Press and release a key that didn't come from the matrix.
    fn tap(&mut self, key: Key, events: &mut dyn EventQueue) {
        if self.keymap.process_record(key, true, events) == Process::Handled {
            let _ = self.keymap.process_record(key, false, events);
            return;
        }

        match key.code() {
            Some(code) => events.push(Event::Key(KeyAction::Tap(code))),
            None => {
                self.default_action(key, true, events);
                self.default_action(key, false, events);
            }
        }
    }

    fn process(&mut self, key: Key, pressed: bool, events: &mut dyn EventQueue) {
        if self.keymap.process_record(key, pressed, events) == Process::Continue {
            self.default_action(key, pressed, events);
        }
    }

    /// What a key does when the keymap leaves it alone.
    fn default_action(&mut self, key: Key, pressed: bool, events: &mut dyn EventQueue) {
        match key {
            Key::Kb(_) | Key::Media(_) => {
                if let Some(code) = key.code() {
                    let action = if pressed {
                        KeyAction::Register(code)
                    } else {
                        KeyAction::Unregister(code)
                    };
                    events.push(Event::Key(action));
                }
            }
            Key::Toggle(layer) => {
                if pressed {
                    self.toggle_layer(layer, events);
                }
            }
            Key::Custom(c) => {
                if pressed {
                    debug!("Unhandled custom key: {:?}", c);
                }
            }
            Key::No | Key::Trans => (),
        }
    }

    fn toggle_layer(&mut self, layer: u8, events: &mut dyn EventQueue) {
        match self.layers.toggle(layer, self.keymap.layers().len()) {
            Ok(()) => {
                info!("Layers: {}, top {}", self.layers.bits(), self.layers.highest());
                events.push(Event::Layer(self.layers));
            }
            Err(e) => warn!("Layer toggle: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::default::DefaultKeymap;
    use super::{LayerState, LayoutManager, MAX_LAYERS};
    use crate::keycodes::{MNXT, PGUP, VOLU};
    use crate::{Error, COLS, NUM_ENCODERS, ROWS};

    #[test]
    fn base_layer_only() {
        let layers = LayerState::default();
        assert!(layers.is_active(0));
        assert!(!layers.is_active(1));
        assert_eq!(layers.highest(), 0);
        assert_eq!(layers.active().collect::<Vec<_>>(), [0]);
    }

    #[test]
    fn toggle_on_and_off() {
        let mut layers = LayerState::default();
        layers.toggle(2, 3).unwrap();
        assert_eq!(layers.highest(), 2);
        assert_eq!(layers.active().collect::<Vec<_>>(), [2, 0]);
        layers.toggle(1, 3).unwrap();
        assert_eq!(layers.active().collect::<Vec<_>>(), [2, 1, 0]);
        layers.toggle(2, 3).unwrap();
        assert_eq!(layers.highest(), 1);
        assert_eq!(layers.bits(), 0b011);
    }

    #[test]
    fn base_stays_on() {
        let mut layers = LayerState::default();
        layers.toggle(0, 1).unwrap();
        assert!(layers.is_active(0));
        assert_eq!(layers, LayerState::default());
    }

    #[test]
    fn missing_layers() {
        let mut layers = LayerState::default();
        assert_eq!(layers.toggle(1, 1), Err(Error::NoSuchLayer(1)));
        assert_eq!(layers.toggle(MAX_LAYERS as u8, 100), Err(Error::NoSuchLayer(8)));
        assert_eq!(layers, LayerState::default());
    }

    #[test]
    fn lookups_off_the_board() {
        let layout = LayoutManager::new(DefaultKeymap);
        assert_eq!(layout.lookup(0, 2), Some(MNXT));
        assert_eq!(layout.lookup(ROWS, 0), None);
        assert_eq!(layout.lookup(0, COLS), None);
        assert_eq!(layout.encoder_lookup(0, true), Some(VOLU));
        assert_eq!(layout.encoder_lookup(1, false), Some(PGUP));
        assert_eq!(layout.encoder_lookup(NUM_ENCODERS, true), None);
    }
}
