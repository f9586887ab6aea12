//! Tests for the keymaps
//!
//! Each test is a script of steps: events fed into the layout manager, and
//! the events we expect to come back out, in order.

use std::collections::VecDeque;

use macropad_keyboard::keycodes::{kb, Key, XXXXXXX};
use macropad_keyboard::layout::default::DefaultKeymap;
use macropad_keyboard::layout::pc::{PcKeymap, NAV};
use macropad_keyboard::layout::{EncoderLayer, Keymap, Layer, LayerState, LayoutManager, Process};
use macropad_keyboard::{
    scan_code, Code, Consumer, Custom, Event, EventQueue, KeyAction, KeyEvent, Keyboard, COLS,
    NUM_AUX, NUM_ENCODERS, ROWS,
};

/// Our steps are each one of these.
enum Step {
    /// A key at (row, col) goes down.
    Press(usize, usize),
    /// A key at (row, col) comes up.
    Release(usize, usize),
    /// A raw scan code, possibly one that isn't on the matrix.
    Raw(KeyEvent),
    /// One encoder detent.
    Encoder(u8, bool),
    /// A sample of the aux button pins.
    Aux([bool; NUM_AUX]),
    /// Expect this event next.
    Expect(Event),
    /// Expect nothing more to have been queued.
    Idle,
}

/// Queue that just remembers everything.
struct TestQueue {
    events: VecDeque<Event>,
}

impl EventQueue for TestQueue {
    fn push(&mut self, val: Event) {
        self.events.push_back(val);
    }
}

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run<K: Keymap>(layout: &mut LayoutManager<K>, steps: &[Step]) {
    init_log();
    let mut queue = TestQueue {
        events: VecDeque::new(),
    };

    for (i, step) in steps.iter().enumerate() {
        match step {
            Step::Press(row, col) => {
                layout.handle_event(KeyEvent::Press(scan_code(*row, *col)), &mut queue)
            }
            Step::Release(row, col) => {
                layout.handle_event(KeyEvent::Release(scan_code(*row, *col)), &mut queue)
            }
            Step::Raw(event) => layout.handle_event(*event, &mut queue),
            Step::Encoder(index, clockwise) => layout.encoder_update(*index, *clockwise, &mut queue),
            Step::Aux(levels) => layout.poll_aux(*levels, &mut queue),
            Step::Expect(event) => match queue.events.pop_front() {
                Some(got) => assert_eq!(&got, event, "step {}", i),
                None => panic!("step {}: expected {:?}, queue empty", i, event),
            },
            Step::Idle => {
                assert!(queue.events.is_empty(), "step {}: unexpected {:?}", i, queue.events);
            }
        }
    }
    assert!(queue.events.is_empty(), "leftover events: {:?}", queue.events);
}

fn reg(k: Keyboard) -> Step {
    Step::Expect(Event::Key(KeyAction::Register(Code::Key(k))))
}

fn unreg(k: Keyboard) -> Step {
    Step::Expect(Event::Key(KeyAction::Unregister(Code::Key(k))))
}

fn tap(k: Keyboard) -> Step {
    Step::Expect(Event::Key(KeyAction::Tap(Code::Key(k))))
}

fn media(action: fn(Code) -> KeyAction, c: Consumer) -> Step {
    Step::Expect(Event::Key(action(Code::Media(c))))
}

fn layers(on: &[u8]) -> Step {
    let mut state = LayerState::default();
    for &l in on {
        state.toggle(l, 8).unwrap();
    }
    Step::Expect(Event::Layer(state))
}

#[test]
fn default_media_row() {
    let mut layout = LayoutManager::new(DefaultKeymap);
    run(
        &mut layout,
        &[
            Step::Press(0, 1),
            media(KeyAction::Register, Consumer::PlayPause),
            Step::Idle,
            Step::Release(0, 1),
            media(KeyAction::Unregister, Consumer::PlayPause),
            // Rolling over two media keys.
            Step::Press(0, 0),
            Step::Press(0, 2),
            Step::Release(0, 0),
            Step::Release(0, 2),
            media(KeyAction::Register, Consumer::ScanPreviousTrack),
            media(KeyAction::Register, Consumer::ScanNextTrack),
            media(KeyAction::Unregister, Consumer::ScanPreviousTrack),
            media(KeyAction::Unregister, Consumer::ScanNextTrack),
            Step::Press(0, 3),
            Step::Release(0, 3),
            media(KeyAction::Register, Consumer::Mute),
            media(KeyAction::Unregister, Consumer::Mute),
        ],
    );
}

#[test]
fn default_editing_shortcuts() {
    let mut layout = LayoutManager::new(DefaultKeymap);
    let mut steps = Vec::new();
    for (col, key) in [Keyboard::C, Keyboard::V, Keyboard::X, Keyboard::Z].into_iter().enumerate() {
        steps.push(Step::Press(1, col));
        steps.push(reg(Keyboard::LeftGUI));
        steps.push(tap(key));
        steps.push(unreg(Keyboard::LeftGUI));
        // The release is swallowed; nothing was left down.
        steps.push(Step::Release(1, col));
        steps.push(Step::Idle);
    }
    run(&mut layout, &steps);
}

#[test]
fn default_custom_shortcuts() {
    let mut layout = LayoutManager::new(DefaultKeymap);
    let mut steps = Vec::new();
    for (col, key) in [Keyboard::O, Keyboard::S, Keyboard::W, Keyboard::B].into_iter().enumerate() {
        steps.push(Step::Press(2, col));
        steps.push(reg(Keyboard::LeftGUI));
        steps.push(tap(key));
        steps.push(unreg(Keyboard::LeftGUI));
        steps.push(Step::Release(2, col));
    }
    run(&mut layout, &steps);
}

#[test]
fn default_meeting_toggles() {
    let mut layout = LayoutManager::new(DefaultKeymap);
    run(
        &mut layout,
        &[
            Step::Press(3, 0),
            reg(Keyboard::LeftGUI),
            reg(Keyboard::LeftShift),
            tap(Keyboard::A),
            unreg(Keyboard::LeftShift),
            unreg(Keyboard::LeftGUI),
            Step::Release(3, 0),
            Step::Press(3, 1),
            reg(Keyboard::LeftGUI),
            reg(Keyboard::LeftShift),
            tap(Keyboard::V),
            unreg(Keyboard::LeftShift),
            unreg(Keyboard::LeftGUI),
            Step::Release(3, 1),
            Step::Press(3, 2),
            reg(Keyboard::LeftGUI),
            tap(Keyboard::D),
            unreg(Keyboard::LeftGUI),
            Step::Release(3, 2),
            Step::Press(3, 3),
            reg(Keyboard::LeftGUI),
            tap(Keyboard::E),
            unreg(Keyboard::LeftGUI),
            Step::Release(3, 3),
        ],
    );
}

#[test]
fn default_encoders() {
    let mut layout = LayoutManager::new(DefaultKeymap);
    run(
        &mut layout,
        &[
            Step::Encoder(0, true),
            media(KeyAction::Tap, Consumer::VolumeIncrement),
            Step::Encoder(0, false),
            media(KeyAction::Tap, Consumer::VolumeDecrement),
            Step::Encoder(1, true),
            tap(Keyboard::PageDown),
            Step::Encoder(1, false),
            tap(Keyboard::PageUp),
            // No such encoder.
            Step::Encoder(2, true),
            Step::Idle,
        ],
    );
}

#[test]
fn default_aux_buttons() {
    let mut layout = LayoutManager::new(DefaultKeymap);
    run(
        &mut layout,
        &[
            // Buttons held at startup don't count.
            Step::Aux([false, false]),
            Step::Idle,
            Step::Aux([true, true]),
            Step::Idle,
            Step::Aux([false, true]),
            media(KeyAction::Tap, Consumer::Mute),
            Step::Aux([false, true]),
            Step::Idle,
            Step::Aux([true, false]),
            media(KeyAction::Tap, Consumer::ALCalculator),
            // Both at once.
            Step::Aux([true, true]),
            Step::Aux([false, false]),
            media(KeyAction::Tap, Consumer::Mute),
            media(KeyAction::Tap, Consumer::ALCalculator),
        ],
    );
}

#[test]
fn stray_events() {
    let mut layout = LayoutManager::new(DefaultKeymap);
    run(
        &mut layout,
        &[
            // A release with no press, and codes off the end of the matrix.
            Step::Release(0, 1),
            Step::Raw(KeyEvent::Press(200)),
            Step::Raw(KeyEvent::Release(200)),
            Step::Idle,
        ],
    );
}

#[test]
fn pc_shortcuts() {
    let rows: [[(&[Keyboard], Keyboard); COLS]; 3] = [
        [
            (&[Keyboard::LeftControl], Keyboard::C),
            (&[Keyboard::LeftControl], Keyboard::V),
            (&[Keyboard::LeftControl], Keyboard::X),
            (&[Keyboard::LeftControl], Keyboard::Z),
        ],
        [
            (&[Keyboard::LeftControl], Keyboard::O),
            (&[Keyboard::LeftControl], Keyboard::S),
            (&[Keyboard::LeftControl], Keyboard::W),
            (&[], Keyboard::F5),
        ],
        [
            (&[Keyboard::LeftAlt], Keyboard::A),
            (&[Keyboard::LeftAlt], Keyboard::V),
            (&[Keyboard::LeftControl], Keyboard::D),
            (&[Keyboard::LeftControl], Keyboard::E),
        ],
    ];

    let mut layout = LayoutManager::new(PcKeymap);
    let mut steps = Vec::new();
    for (row, bindings) in rows.iter().enumerate() {
        for (col, &(mods, key)) in bindings.iter().enumerate() {
            steps.push(Step::Press(row + 1, col));
            steps.extend(mods.iter().map(|&m| reg(m)));
            steps.push(tap(key));
            steps.extend(mods.iter().rev().map(|&m| unreg(m)));
            steps.push(Step::Release(row + 1, col));
            steps.push(Step::Idle);
        }
    }
    run(&mut layout, &steps);
}

#[test]
fn pc_encoders_and_aux_buttons() {
    let mut layout = LayoutManager::new(PcKeymap);
    run(
        &mut layout,
        &[
            Step::Encoder(0, true),
            media(KeyAction::Tap, Consumer::VolumeIncrement),
            Step::Encoder(0, false),
            media(KeyAction::Tap, Consumer::VolumeDecrement),
            Step::Encoder(1, true),
            tap(Keyboard::PageDown),
            Step::Encoder(1, false),
            tap(Keyboard::PageUp),
            Step::Aux([true, true]),
            Step::Aux([false, true]),
            media(KeyAction::Tap, Consumer::Mute),
            Step::Aux([true, false]),
            media(KeyAction::Tap, Consumer::ALCalculator),
            Step::Aux([true, true]),
            Step::Idle,
        ],
    );
}

#[test]
fn pc_nav_layer() {
    let mut layout = LayoutManager::new(PcKeymap);
    run(
        &mut layout,
        &[
            Step::Press(0, 3),
            layers(&[NAV]),
            Step::Release(0, 3),
            Step::Idle,
            // Nav keys replace the shortcuts.
            Step::Press(1, 1),
            reg(Keyboard::UpArrow),
            Step::Release(1, 1),
            unreg(Keyboard::UpArrow),
            // The media row shows through.
            Step::Press(0, 1),
            media(KeyAction::Register, Consumer::PlayPause),
            Step::Release(0, 1),
            media(KeyAction::Unregister, Consumer::PlayPause),
            // So do the meeting toggles.
            Step::Press(3, 3),
            reg(Keyboard::LeftControl),
            tap(Keyboard::E),
            unreg(Keyboard::LeftControl),
            Step::Release(3, 3),
            Step::Idle,
            // Encoders follow the layer.
            Step::Encoder(0, true),
            media(KeyAction::Tap, Consumer::ScanNextTrack),
            Step::Encoder(1, false),
            tap(Keyboard::LeftArrow),
            // Hold a key across the toggle; it still releases what it pressed.
            Step::Press(2, 3),
            reg(Keyboard::PageDown),
            Step::Press(0, 3),
            layers(&[]),
            Step::Release(0, 3),
            Step::Release(2, 3),
            unreg(Keyboard::PageDown),
            // Back on the base layer.
            Step::Encoder(0, true),
            media(KeyAction::Tap, Consumer::VolumeIncrement),
        ],
    );
    assert_eq!(layout.layers(), LayerState::default());
}

#[test]
fn table_dimensions() {
    fn check<K: Keymap>(keymap: &K) {
        let layers = keymap.layers();
        assert!(!layers.is_empty(), "{} has no layers", K::NAME);
        assert!(layers.len() <= 8);
        for layer in layers {
            assert_eq!(layer.len(), ROWS);
            assert!(layer.iter().all(|row| row.len() == COLS));
        }
        assert_eq!(keymap.encoders().len(), layers.len(), "{}", K::NAME);
        for enc in keymap.encoders() {
            assert_eq!(enc.len(), NUM_ENCODERS);
        }
        // The base layer has nothing to fall through to.
        assert!(layers[0].iter().flatten().all(|&k| k != Key::Trans));
    }
    check(&DefaultKeymap);
    check(&PcKeymap);
}

/// A keymap that leaves a few things for the defaults to deal with.
struct Bare;

static BARE_LAYERS: [Layer; 1] = [[
    [Key::Custom(Custom::WireShadeToggle), XXXXXXX, kb(Keyboard::A), Key::Toggle(3)],
    [XXXXXXX; COLS],
    [XXXXXXX; COLS],
    [XXXXXXX; COLS],
]];

static BARE_ENCODERS: [EncoderLayer; 1] = [[[XXXXXXX, Key::Custom(Custom::Run)], [XXXXXXX; 2]]];

impl Keymap for Bare {
    const NAME: &'static str = "bare";

    fn layers(&self) -> &'static [Layer] {
        &BARE_LAYERS
    }

    fn encoders(&self) -> &'static [EncoderLayer] {
        &BARE_ENCODERS
    }

    fn aux_buttons(&self) -> [Key; NUM_AUX] {
        [Key::Custom(Custom::Run), XXXXXXX]
    }

    fn process_record(&mut self, key: Key, pressed: bool, events: &mut dyn EventQueue) -> Process {
        if key == Key::Custom(Custom::Run) && pressed {
            events.push(Event::Key(KeyAction::Tap(Code::Key(Keyboard::F9))));
            return Process::Handled;
        }
        Process::Continue
    }

    fn encoder_update(&mut self, index: u8, clockwise: bool, events: &mut dyn EventQueue) -> Process {
        if index == 1 {
            let k = if clockwise { Keyboard::DownArrow } else { Keyboard::UpArrow };
            events.push(Event::Key(KeyAction::Tap(Code::Key(k))));
            return Process::Handled;
        }
        Process::Continue
    }
}

#[test]
fn fall_through() {
    let mut layout = LayoutManager::new(Bare);
    run(
        &mut layout,
        &[
            // Unhandled custom keys and empty cells do nothing.
            Step::Press(0, 0),
            Step::Release(0, 0),
            Step::Press(0, 1),
            Step::Release(0, 1),
            Step::Idle,
            // Plain keys get the default.
            Step::Press(0, 2),
            reg(Keyboard::A),
            Step::Release(0, 2),
            unreg(Keyboard::A),
            // Toggling a layer the keymap doesn't have.
            Step::Press(0, 3),
            Step::Release(0, 3),
            Step::Idle,
            // Custom keys on the encoder and aux tables reach the handler.
            Step::Encoder(0, true),
            tap(Keyboard::F9),
            Step::Encoder(0, false),
            Step::Idle,
            Step::Aux([true, true]),
            Step::Aux([false, false]),
            tap(Keyboard::F9),
            // The encoder override wins over the table.
            Step::Encoder(1, true),
            tap(Keyboard::DownArrow),
        ],
    );
    assert_eq!(layout.layers(), LayerState::default());
}
