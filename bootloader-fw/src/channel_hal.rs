// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! `Channel` implementation over an RP2040 UART.
//!
//! The host link (UART0) carries commands, metadata, and frame payloads in
//! both directions. The debug link (UART1) carries the operator banner,
//! authenticators, and the release message.

use bootloader_core::{Channel, ChannelError};
use embedded_hal_nb::serial::{Read, Write};

pub struct UartChannel<U> {
    uart: U,
}

impl<U> UartChannel<U> {
    pub fn new(uart: U) -> Self {
        Self { uart }
    }
}

impl<U> Channel for UartChannel<U>
where
    U: Read<u8> + Write<u8>,
{
    fn read_byte(&mut self) -> Result<u8, ChannelError> {
        nb::block!(self.uart.read()).map_err(|_| ChannelError)
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = nb::block!(self.uart.write(byte));
    }
}
