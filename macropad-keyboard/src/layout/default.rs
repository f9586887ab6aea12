//! The default keymap
//!
//! A single layer of macOS shortcuts:
//!
//! - Row 1: media controls.
//! - Row 2: the usual editing commands.
//! - Row 3: open, save, close tab, and build/run (Cmd-B, as in Xcode and
//!   Sublime).
//! - Row 4: mic and video toggles for Zoom and Google Meet.
//!
//! The left encoder is volume, the right one pages up and down.  Pushing them
//! in mutes and brings up the calculator.

use usbd_human_interface_device::page::Keyboard;

use super::{EncoderLayer, Keymap, Layer, Process};
use crate::keycodes::*;
use crate::{chord, EventQueue, Mods, NUM_AUX};

static LAYERS: [Layer; 1] = [[
    [MPRV, MPLY, MNXT, MUTE],
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
]];

// [counter-clockwise, clockwise]
static ENCODERS: [EncoderLayer; 1] = [[[VOLD, VOLU], [PGUP, PGDN]]];

#[derive(Default)]
pub struct DefaultKeymap;

impl DefaultKeymap {
    /// The shortcut a key stands for, if it is one.
    fn shortcut(key: Key) -> Option<(Mods, Keyboard)> {
        let shortcut = match key {
            Key::Kb(Keyboard::Copy) => (Mods::GUI, Keyboard::C),
            Key::Kb(Keyboard::Paste) => (Mods::GUI, Keyboard::V),
            Key::Kb(Keyboard::Cut) => (Mods::GUI, Keyboard::X),
            Key::Kb(Keyboard::Undo) => (Mods::GUI, Keyboard::Z),
            Key::Custom(Custom::Open) => (Mods::GUI, Keyboard::O),
            Key::Custom(Custom::Save) => (Mods::GUI, Keyboard::S),
            Key::Custom(Custom::CloseWindow) => (Mods::GUI, Keyboard::W),
            Key::Custom(Custom::Run) => (Mods::GUI, Keyboard::B),
            Key::Custom(Custom::ZoomToggleMic) => (Mods::GUI | Mods::SHIFT, Keyboard::A),
            Key::Custom(Custom::ZoomToggleVideo) => (Mods::GUI | Mods::SHIFT, Keyboard::V),
            Key::Custom(Custom::MeetToggleMic) => (Mods::GUI, Keyboard::D),
            Key::Custom(Custom::MeetToggleVideo) => (Mods::GUI, Keyboard::E),
            _ => return None,
        };
        Some(shortcut)
    }
}

impl Keymap for DefaultKeymap {
    const NAME: &'static str = "default";

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
