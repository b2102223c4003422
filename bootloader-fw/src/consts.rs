// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Compile-time platform configuration: flash layout and pre-shared keys.
//!
//! The keys below are build-time placeholders. A production image replaces
//! them at provisioning time (e.g. via a build-script-generated `consts.rs`
//! or a linker-injected section), never by editing this file per-device.

use bootloader_core::FlashLayout;

pub const FLASH_BASE: u32 = 0x1000_0000;

/// The bootloader itself occupies the first 64 KiB of flash.
pub const MSG_ADDR: u32 = FLASH_BASE + 0xF800;
pub const META_ADDR: u32 = FLASH_BASE + 0xFC00;
pub const FW_ADDR: u32 = FLASH_BASE + 0x1_0000;

pub const LAYOUT: FlashLayout = FlashLayout::new(META_ADDR, MSG_ADDR, FW_ADDR);

/// Hardware erase granularity. A single logical page (1 KiB) is smaller
/// than this, so `flash_hal` only erases a sector the first time one of its
/// pages is programmed in a transaction.
pub const FLASH_SECTOR_SIZE: u32 = 4096;

pub const HMAC_KEY: [u8; 32] = [
    0x8f, 0x2a, 0x4e, 0x91, 0x03, 0x7c, 0xd5, 0x1b, 0x6a, 0xe9, 0x44, 0xf0, 0x2d, 0x88, 0x5b, 0x3e,
    0x7a, 0x19, 0xc6, 0x52, 0xab, 0x0d, 0xf4, 0x3c, 0x95, 0x61, 0x2e, 0xd8, 0x07, 0xba, 0x4f, 0x10,
];
pub const AES_KEY: [u8; 16] = [
    0x3d, 0xc1, 0x8a, 0x56, 0xe2, 0x9f, 0x04, 0x7b, 0x1e, 0x6d, 0xa8, 0x33, 0xf9, 0x20, 0x5c, 0x77,
];
