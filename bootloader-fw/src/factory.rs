// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The factory-installed firmware image, provisioned once at power-on when
//! the metadata page still reads as erased (`0xFF` throughout).
//!
//! A production build replaces `FACTORY_IMAGE` with the real application
//! image via a build script (`include_bytes!` against a path set by an
//! environment variable), not by editing this file.

pub const FACTORY_VERSION: u16 = 2;
pub const FACTORY_MESSAGE: &[u8] = b"This is the initial release message.";

pub static FACTORY_IMAGE: &[u8] = include_bytes!("../assets/factory_firmware.bin");
