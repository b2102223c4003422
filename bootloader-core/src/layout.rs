// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash layout constants and size bounds.

/// Flash page size; also the maximum size of a single upload frame.
pub const PAGE: usize = 1024;

/// Maximum firmware image size (30 KiB).
pub const FW_MAX: usize = 30 * 1024;

/// Maximum release message size (1 KiB).
pub const MSG_MAX: usize = 1024;

/// On-wire size of the firmware metadata structure.
pub const FW_METADATA_SIZE: usize = 6;

/// On-wire size of the frame metadata structure.
pub const FRAME_METADATA_SIZE: usize = 6;

/// Size of an HMAC-SHA256 digest.
pub const HMAC_SIZE: usize = 32;

/// Size of the AES-GCM IV and tag.
pub const IV_SIZE: usize = 16;
pub const TAG_SIZE: usize = 16;

/// Staging buffer capacity: firmware + its trailing metadata + release message.
pub const STAGING_SIZE: usize = FW_MAX + FW_METADATA_SIZE + MSG_MAX;

/// Firmware version value reserved by the wire protocol; never a valid upload version.
pub const RESERVED_VERSION: u16 = 1;

/// Firmware version value that requests a rollback-exempt debug upload.
pub const DEBUG_VERSION: u16 = 0;

/// Placement of the persisted image in flash. A value, not a global constant,
/// so the protocol core can be exercised against a differently laid-out fake
/// flash in tests without recompiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlashLayout {
    pub meta_addr: u32,
    pub msg_addr: u32,
    pub fw_addr: u32,
}

impl FlashLayout {
    pub const fn new(meta_addr: u32, msg_addr: u32, fw_addr: u32) -> Self {
        Self {
            meta_addr,
            msg_addr,
            fw_addr,
        }
    }
}
