//! Firmware for a 4x4 ortholinear macropad
//!
//! Scans the key matrix, the two rotary encoders and their push switches,
//! runs everything through the keymap, and sends the result to the host as a
//! USB keyboard and consumer control device.
#![no_std]
#![no_main]

use arraydeque::ArrayDeque;
use bsp::entry;
use cortex_m::delay::Delay;
use defmt::{info, warn};
use defmt_rtt as _;
use embedded_hal::digital::v2::InputPin;
use fugit::ExtU64;
use panic_probe as _;
use smart_leds::{SmartLedsWrite, RGB8};
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::prelude::UsbDeviceState;
use ws2812_pio::Ws2812Direct;

// Provide an alias for our BSP so we can switch targets quickly.
use sparkfun_pro_micro_rp2040 as bsp;

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    gpio::{DynPinId, FunctionSioInput, FunctionSioOutput, Pin, PullDown, PullUp},
    pac,
    pio::PIOExt,
    sio::Sio,
    watchdog::Watchdog,
    Timer,
};

use bsp::hal;

use macropad_keyboard::{Event, EventQueue, LayoutManager, NUM_AUX, NUM_ENCODERS};

#[cfg(all(feature = "keymap-default", feature = "keymap-pc"))]
compile_error!("Only one keymap feature may be enabled");

#[cfg(not(any(feature = "keymap-default", feature = "keymap-pc")))]
compile_error!("One of the keymap features must be enabled");

#[cfg(feature = "keymap-default")]
use macropad_keyboard::layout::default::DefaultKeymap as ActiveKeymap;
#[cfg(feature = "keymap-pc")]
use macropad_keyboard::layout::pc::PcKeymap as ActiveKeymap;

mod board;
mod encoders;
mod leds;
mod matrix;
mod usb;

use board::{NCOLS, NKEYS, NROWS};
use encoders::Encoders;
use leds::LedManager;
use matrix::Matrix;
use usb::UsbHandler;

type ColPin = Pin<DynPinId, FunctionSioOutput, PullDown>;
type RowPin = Pin<DynPinId, FunctionSioInput, PullDown>;
type SwitchPin = Pin<DynPinId, FunctionSioInput, PullUp>;

type MatrixType = Matrix<RowPin, ColPin, NCOLS, NROWS, NKEYS>;

#[entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let core = pac::CorePeripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    info!("Program start");
    // External high-speed crystal on the pico board is 12Mhz
    let clocks = init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let delay = Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());

    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
    let ws = Ws2812Direct::new(
        pins.led.into_function(),
        &mut pio,
        sm0,
        clocks.peripheral_clock.freq(),
    );
    let led_manager = LedManager::new(ws);

    let usb_bus = UsbBusAllocator::new(hal::usb::UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));
    let usb_handler = UsbHandler::new(&usb_bus);

    let matrix: MatrixType = Matrix::new(board::cols!(pins), board::rows!(pins));
    let encoders: Encoders<SwitchPin, NUM_ENCODERS> = Encoders::new(board::encoders!(pins));
    let aux: [SwitchPin; NUM_AUX] = board::aux!(pins);

    let layout_manager = LayoutManager::new(ActiveKeymap);

    main_loop(
        timer,
        delay,
        usb_handler,
        matrix,
        encoders,
        aux,
        layout_manager,
        led_manager,
    );
}

#[allow(clippy::too_many_arguments)]
fn main_loop<L: SmartLedsWrite<Color = RGB8>>(
    timer: Timer,
    mut delay: Delay,
    mut usb_handler: UsbHandler<hal::usb::UsbBus>,
    mut matrix: MatrixType,
    mut encoders: Encoders<SwitchPin, NUM_ENCODERS>,
    aux: [SwitchPin; NUM_AUX],
    mut layout_manager: LayoutManager<ActiveKeymap>,
    mut led_manager: LedManager<L>,
) -> ! {
    let fast = 10u64.micros();
    let slow = 1_000u64.micros();
    let mut next_1ms = timer.get_counter() + slow;
    let mut next_10us = timer.get_counter() + fast;

    let mut events = Events::new();
    let mut usb_suspended = true;
    loop {
        let now = timer.get_counter();

        // Rapid poll first.
        if now > next_10us {
            // Ideally this would be periodic, but it is also possible we never
            // keep up.
            usb_handler.poll(&mut events);
            next_10us = now + fast;
        }

        // Slow poll next.
        if now > next_1ms {
            usb_handler.tick();
            matrix.tick(&mut delay, &mut events);
            encoders.tick(&mut events);

            // The switches pull their pins low when pressed.
            let levels = core::array::from_fn(|i| aux[i].is_high().unwrap_or(true));
            layout_manager.poll_aux(levels, &mut events);

            // Handle the event queue.
            while let Some(event) = events.pop() {
                match event {
                    Event::Matrix(key) => {
                        layout_manager.handle_event(key, &mut events);
                        if usb_suspended {
                            usb_handler.wakeup();
                        }
                    }
                    Event::Encoder { index, clockwise } => {
                        layout_manager.encoder_update(index, clockwise, &mut events);
                    }
                    Event::Key(action) => {
                        usb_handler.enqueue(action);
                    }
                    Event::Layer(layers) => {
                        led_manager.set_layer(layers.highest());
                    }
                    Event::UsbState(UsbDeviceState::Configured) => {
                        led_manager.set_layer(layout_manager.layers().highest());
                        usb_suspended = false;
                    }
                    Event::UsbState(UsbDeviceState::Suspend) => {
                        // This indicates the host has gone to sleep.
                        led_manager.set_sleep();
                        usb_suspended = true;
                    }
                    Event::UsbState(_) => (),
                }
            }
            led_manager.tick();

            next_1ms = now + slow;
        }
    }
}

/// The queue between the scanners, the keymap, and the USB handler.
struct Events(ArrayDeque<Event, 64>);

impl Events {
    fn new() -> Self {
        Events(ArrayDeque::new())
    }

    fn pop(&mut self) -> Option<Event> {
        self.0.pop_front()
    }
}

impl EventQueue for Events {
    fn push(&mut self, val: Event) {
        if self.0.push_back(val).is_err() {
            warn!("Event queue full");
        }
    }
}
