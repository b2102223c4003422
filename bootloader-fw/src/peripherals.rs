// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Peripheral initialization for the bootloader: clocks, the status LED,
//! and the two UARTs that carry the host and debug channels.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use fugit::RateExtU32;
use rp2040_hal as hal;
use rp2040_hal::uart::{DataBits, StopBits, UartConfig, UartPeripheral};
use rp2040_hal::Clock;

use crate::channel_hal::UartChannel;

pub type LedPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio25, hal::gpio::FunctionSioOutput, hal::gpio::PullDown>;

type HostUartPins = (
    hal::gpio::Pin<hal::gpio::bank0::Gpio0, hal::gpio::FunctionUart, hal::gpio::PullNone>,
    hal::gpio::Pin<hal::gpio::bank0::Gpio1, hal::gpio::FunctionUart, hal::gpio::PullNone>,
);
type DebugUartPins = (
    hal::gpio::Pin<hal::gpio::bank0::Gpio4, hal::gpio::FunctionUart, hal::gpio::PullNone>,
    hal::gpio::Pin<hal::gpio::bank0::Gpio5, hal::gpio::FunctionUart, hal::gpio::PullNone>,
);

pub type HostUart = UartPeripheral<hal::uart::Enabled, hal::pac::UART0, HostUartPins>;
pub type DebugUart = UartPeripheral<hal::uart::Enabled, hal::pac::UART1, DebugUartPins>;

pub struct Peripherals {
    pub led_pin: LedPin,
    pub timer: hal::Timer,
    pub host: UartChannel<HostUart>,
    pub debug: UartChannel<DebugUart>,
}

const BAUD_RATE: u32 = 115_200;

pub fn init() -> Peripherals {
    let mut pac = unsafe { hal::pac::Peripherals::steal() };

    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
    let clocks = hal::clocks::init_clocks_and_plls(
        12_000_000u32,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let host_pins = (
        pins.gpio0.into_pull_type::<hal::gpio::PullNone>().into_function(),
        pins.gpio1.into_pull_type::<hal::gpio::PullNone>().into_function(),
    );
    let host_uart = UartPeripheral::new(pac.UART0, host_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(BAUD_RATE.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();

    let debug_pins = (
        pins.gpio4.into_pull_type::<hal::gpio::PullNone>().into_function(),
        pins.gpio5.into_pull_type::<hal::gpio::PullNone>().into_function(),
    );
    let debug_uart = UartPeripheral::new(pac.UART1, debug_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(BAUD_RATE.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();

    Peripherals {
        led_pin: pins.gpio25.into_push_pull_output(),
        timer,
        host: UartChannel::new(host_uart),
        debug: UartChannel::new(debug_uart),
    }
}

/// Flash the status LED `count` times, `period_ms` on and off, as a visible
/// sign that power-on init finished before the dispatch loop starts.
pub fn blink(led: &mut impl OutputPin, timer: &mut impl DelayNs, count: u32, period_ms: u32) {
    for _ in 0..count {
        led.set_high().ok();
        timer.delay_ms(period_ms);
        led.set_low().ok();
        timer.delay_ms(period_ms);
    }
}
