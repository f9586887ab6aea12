// Usb HID management.

use arraydeque::ArrayDeque;
use arrayvec::ArrayVec;
use defmt::{info, warn};
use frunk::{HCons, HNil};
use macropad_keyboard::{Code, Event, EventQueue, KeyAction};
use usb_device::{
    class_prelude::{UsbBus, UsbBusAllocator, UsbClass},
    prelude::{UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid},
    UsbError,
};
use usbd_human_interface_device::{
    device::{
        consumer::{ConsumerControl, ConsumerControlConfig, MultipleConsumerReport},
        keyboard::{NKROBootKeyboard, NKROBootKeyboardConfig},
        DeviceClass,
    },
    page::{Consumer, Keyboard},
    usb_class::{UsbHidClass, UsbHidClassBuilder},
    UsbHidError,
};

use crate::board;

// Type of the device list, which is internal to usbd_human_interface_device.
// The last device added ends up at the head.
type InterfaceList<'a, Bus> = HCons<ConsumerControl<'a, Bus>, HCons<NKROBootKeyboard<'a, Bus>, HNil>>;

/// Consumer usages that can be held at once.
const MEDIA_SLOTS: usize = 4;

pub struct UsbHandler<'a, Bus: UsbBus> {
    dev: UsbDevice<'a, Bus>,
    hid: UsbHidClass<'a, Bus, InterfaceList<'a, Bus>>,
    state: Option<UsbDeviceState>,
    actions: ArrayDeque<KeyAction, 128>,

    /// Keyboard usages currently held down on the host.
    keys: ArrayVec<Keyboard, 16>,
    /// Consumer usages currently held down on the host.
    media: ArrayVec<Consumer, MEDIA_SLOTS>,
}

impl<'a, Bus: UsbBus> UsbHandler<'a, Bus> {
    pub fn new(usb_bus: &'a UsbBusAllocator<Bus>) -> Self {
        let hid = UsbHidClassBuilder::new()
            .add_device(NKROBootKeyboardConfig::default())
            .add_device(ConsumerControlConfig::default())
            .build(usb_bus);
        let dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(board::USB_VID, board::USB_PID))
            .manufacturer(board::USB_MANUFACTURER)
            .product(board::USB_PRODUCT)
            .serial_number(board::USB_SERIAL)
            .device_class(0)
            .max_power(500)
            .supports_remote_wakeup(true)
            .build();
        UsbHandler {
            dev,
            hid,
            state: None,
            actions: ArrayDeque::new(),
            keys: ArrayVec::new(),
            media: ArrayVec::new(),
        }
    }

    /// Add an action to be shipped off to the USB host.  If the deque is
    /// full, log a message, but discard.
    pub fn enqueue(&mut self, action: KeyAction) {
        if self.actions.push_back(action).is_err() {
            warn!("Key action queue full.");
        }
    }

    /// Perform a 1khz tick operation.
    ///
    /// At most one queued action is turned into a report per tick, so the
    /// host sees every press and release as a separate report.
    pub fn tick(&mut self) {
        let _ = self.hid.device::<NKROBootKeyboard<'a, Bus>, _>().tick();

        let Some(action) = self.actions.front().copied() else {
            return;
        };

        // Applying an action to the held sets is idempotent, so a report
        // that couldn't be sent is simply rebuilt on the next tick.
        let sent = match action {
            KeyAction::Register(code) | KeyAction::Tap(code) => {
                self.hold(code);
                self.send(code)
            }
            KeyAction::Unregister(code) => {
                self.release(code);
                self.send(code)
            }
        };

        if sent {
            let _ = self.actions.pop_front();
            // The release half of a tap goes out on the next tick.
            if let KeyAction::Tap(code) = action {
                let _ = self.actions.push_front(KeyAction::Unregister(code));
            }
        }
    }

    fn hold(&mut self, code: Code) {
        match code {
            Code::Key(k) => {
                if !self.keys.contains(&k) && self.keys.try_push(k).is_err() {
                    warn!("Too many keys held");
                }
            }
            Code::Media(c) => {
                if !self.media.contains(&c) && self.media.try_push(c).is_err() {
                    warn!("Too many media keys held");
                }
            }
        }
    }

    fn release(&mut self, code: Code) {
        match code {
            Code::Key(k) => self.keys.retain(|held| *held != k),
            Code::Media(c) => self.media.retain(|held| *held != c),
        }
    }

    /// Write the report for whichever interface `code` belongs to.  Returns
    /// true once the report is handled.
    fn send(&mut self, code: Code) -> bool {
        match code {
            Code::Key(_) => self.send_keyboard(),
            Code::Media(_) => self.send_media(),
        }
    }

    fn send_keyboard(&mut self) -> bool {
        let keyboard = self.hid.device::<NKROBootKeyboard<'a, Bus>, _>();
        let status = if self.keys.is_empty() {
            keyboard.write_report([Keyboard::NoEventIndicated])
        } else {
            keyboard.write_report(self.keys.iter().cloned())
        };
        match status {
            Ok(()) => true,
            Err(UsbHidError::WouldBlock) => false,
            Err(UsbHidError::Duplicate) => {
                // The host already has this state, so there is nothing to
                // wait for.
                true
            }
            Err(UsbHidError::UsbError(_)) => {
                warn!("USB error");
                false
            }
            Err(UsbHidError::SerializationError) => {
                warn!("SerializationError");
                true
            }
        }
    }

    fn send_media(&mut self) -> bool {
        let mut report = MultipleConsumerReport {
            codes: [Consumer::Unassigned; MEDIA_SLOTS],
        };
        for (slot, code) in report.codes.iter_mut().zip(self.media.iter()) {
            *slot = *code;
        }
        match self.hid.device::<ConsumerControl<'a, Bus>, _>().write_report(&report) {
            Ok(_) => true,
            Err(UsbError::WouldBlock) => false,
            Err(_) => {
                warn!("USB error on consumer report");
                false
            }
        }
    }

    /// Perform a periodic poll.  Ideally, this would be interrupt driven, but
    /// calling sufficiently fast should also work.
    /// The docs suggest this can be called on say a 1ms tick, but this seems to
    /// break device identification.
    pub fn poll(&mut self, events: &mut dyn EventQueue) {
        if self.dev.poll(&mut [&mut self.hid]) {
            self.hid.poll();
            if let Ok(l) = self.hid.device::<NKROBootKeyboard<'a, Bus>, _>().read_report() {
                info!("Report: {}", l.caps_lock);
            }
        }

        // Check for state changes.
        let new_state = self.dev.state();
        if self.state != Some(new_state) {
            match new_state {
                UsbDeviceState::Addressed => info!("State: Addressed"),
                UsbDeviceState::Configured => info!("State: Configured"),
                UsbDeviceState::Default => info!("State: Default"),
                UsbDeviceState::Suspend => info!("State: Suspend"),
            }
            self.state = Some(new_state);
            events.push(Event::UsbState(new_state));
        }
    }
}

/// The remote wakeup is only available for this specific hal.
impl<'a> UsbHandler<'a, crate::bsp::hal::usb::UsbBus> {
    /// Inform the host that we'd like to request they wake up.  This should be
    /// called only from suspend state.
    pub fn wakeup(&mut self) {
        if self.dev.remote_wakeup_enabled() {
            self.dev.bus().remote_wakeup();
        }
    }
}
