// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Hardware-independent core of the firmware-update bootloader: the update
//! protocol state machine, its cryptographic verification pipeline, and the
//! flash-region programming algorithm.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std`, used by the device binary.
//! - `std` feature: used by the host-side update tool, which shares the wire
//!   types and layout constants but performs none of the device-side I/O.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channel;
pub mod crypto;
pub mod error;
pub mod flash;
pub mod layout;
pub mod metadata;
pub mod protocol;
pub mod staging;

#[cfg(any(test, feature = "std"))]
pub mod fake;

pub use channel::{Channel, ChannelError, Writer};
pub use crypto::Verifier;
pub use error::{AuthStage, UpdateError};
pub use flash::{FlashError, FlashRegion, RawFlash};
pub use layout::FlashLayout;
pub use metadata::{FrameMetadata, FirmwareMetadata};
pub use protocol::{run_update, ERROR, OK};
pub use staging::StagingBuffer;
