//! PC keymap
//!
//! The same pad for Linux and Windows hosts.  Shortcuts are built on Control
//! rather than Command, and the mute key in the corner becomes a toggle for a
//! second layer of navigation keys.  Mute is still on the left encoder's
//! button.

use usbd_human_interface_device::page::Keyboard;

use super::{EncoderLayer, Keymap, Layer, Process};
use crate::keycodes::*;
use crate::{chord, EventQueue, Mods, NUM_AUX};

/// Layer numbers.
pub const BASE: u8 = 0;
pub const NAV: u8 = 1;

static LAYERS: [Layer; 2] = [
    // BASE
    [
        [MPRV, MPLY, MNXT, tg(NAV)],
        [COPY, PASTE, CUT, UNDO],
        [
            custom(Custom::Open),
            custom(Custom::Save),
            custom(Custom::CloseWindow),
            custom(Custom::Run),
        ],
        [
            custom(Custom::ZoomToggleMic),
            custom(Custom::ZoomToggleVideo),
            custom(Custom::MeetToggleMic),
            custom(Custom::MeetToggleVideo),
        ],
    ],
    // NAV
    [
        [_______, _______, _______, tg(NAV)],
        [HOME, UP, END, PGUP],
        [LEFT, DOWN, RIGHT, PGDN],
        [_______, _______, _______, _______],
    ],
];

// [counter-clockwise, clockwise]
static ENCODERS: [EncoderLayer; 2] = [
    [[VOLD, VOLU], [PGUP, PGDN]],
    [[MPRV, MNXT], [LEFT, RIGHT]],
];

#[derive(Default)]
pub struct PcKeymap;

impl PcKeymap {
    fn shortcut(key: Key) -> Option<(Mods, Keyboard)> {
        let shortcut = match key {
            Key::Kb(Keyboard::Copy) => (Mods::CONTROL, Keyboard::C),
            Key::Kb(Keyboard::Paste) => (Mods::CONTROL, Keyboard::V),
            Key::Kb(Keyboard::Cut) => (Mods::CONTROL, Keyboard::X),
            Key::Kb(Keyboard::Undo) => (Mods::CONTROL, Keyboard::Z),
            Key::Custom(Custom::Open) => (Mods::CONTROL, Keyboard::O),
            Key::Custom(Custom::Save) => (Mods::CONTROL, Keyboard::S),
            Key::Custom(Custom::CloseWindow) => (Mods::CONTROL, Keyboard::W),
            Key::Custom(Custom::Run) => (Mods::empty(), Keyboard::F5),
            Key::Custom(Custom::ZoomToggleMic) => (Mods::ALT, Keyboard::A),
            Key::Custom(Custom::ZoomToggleVideo) => (Mods::ALT, Keyboard::V),
            Key::Custom(Custom::MeetToggleMic) => (Mods::CONTROL, Keyboard::D),
            Key::Custom(Custom::MeetToggleVideo) => (Mods::CONTROL, Keyboard::E),
            _ => return None,
        };
        Some(shortcut)
    }
}

impl Keymap for PcKeymap {
    const NAME: &'static str = "pc";

    fn layers(&self) -> &'static [Layer] {
        &LAYERS
    }

    fn encoders(&self) -> &'static [EncoderLayer] {
        &ENCODERS
    }

    fn aux_buttons(&self) -> [Key; NUM_AUX] {
        [MUTE, CALC]
    }

    fn process_record(&mut self, key: Key, pressed: bool, events: &mut dyn EventQueue) -> Process {
        match Self::shortcut(key) {
            Some((mods, k)) => {
                if pressed {
                    chord(mods, k, events);
                }
                Process::Handled
            }
            None => Process::Continue,
        }
    }
}
