//! Keycodes
//!
//! A keymap cell is a [`Key`].  Most cells name a plain HID usage, either from
//! the keyboard page or from the consumer page (media and volume controls).
//! The rest are either layer toggles or [`Custom`] codes that only mean
//! something to a keymap's own record handler.

use usbd_human_interface_device::page::{Consumer, Keyboard};

/// One cell of a keymap.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Nothing happens.
    No,
    /// Use whatever the next lower active layer has here.
    Trans,
    /// A keyboard page usage.
    Kb(Keyboard),
    /// A consumer page usage.
    Media(Consumer),
    /// Handled by the keymap itself.
    Custom(Custom),
    /// Flip the given layer on or off when pressed.
    Toggle(u8),
}

/// Keycodes with no HID meaning of their own.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Custom {
    WireShadeToggle,
    ZoomToggleMic,
    ZoomToggleVideo,
    MeetToggleMic,
    MeetToggleVideo,
    Open,
    Save,
    CloseWindow,
    Run,
}

/// A usage that can actually be sent to the host.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Code {
    Key(Keyboard),
    Media(Consumer),
}

impl Key {
    /// The HID usage this key sends by default, if any.
    pub fn code(self) -> Option<Code> {
        match self {
            Key::Kb(k) => Some(Code::Key(k)),
            Key::Media(c) => Some(Code::Media(c)),
            _ => None,
        }
    }
}

pub const fn kb(k: Keyboard) -> Key {
    Key::Kb(k)
}

pub const fn media(c: Consumer) -> Key {
    Key::Media(c)
}

pub const fn custom(c: Custom) -> Key {
    Key::Custom(c)
}

pub const fn tg(layer: u8) -> Key {
    Key::Toggle(layer)
}

// Short names, so the tables line up.
pub const XXXXXXX: Key = Key::No;
pub const _______: Key = Key::Trans;

pub const MPRV: Key = media(Consumer::ScanPreviousTrack);
pub const MPLY: Key = media(Consumer::PlayPause);
pub const MNXT: Key = media(Consumer::ScanNextTrack);
pub const MUTE: Key = media(Consumer::Mute);
pub const VOLU: Key = media(Consumer::VolumeIncrement);
pub const VOLD: Key = media(Consumer::VolumeDecrement);
pub const CALC: Key = media(Consumer::ALCalculator);

pub const COPY: Key = kb(Keyboard::Copy);
pub const PASTE: Key = kb(Keyboard::Paste);
pub const CUT: Key = kb(Keyboard::Cut);
pub const UNDO: Key = kb(Keyboard::Undo);

pub const PGUP: Key = kb(Keyboard::PageUp);
pub const PGDN: Key = kb(Keyboard::PageDown);
pub const HOME: Key = kb(Keyboard::Home);
pub const END: Key = kb(Keyboard::End);
pub const LEFT: Key = kb(Keyboard::LeftArrow);
pub const RIGHT: Key = kb(Keyboard::RightArrow);
pub const UP: Key = kb(Keyboard::UpArrow);
pub const DOWN: Key = kb(Keyboard::DownArrow);
