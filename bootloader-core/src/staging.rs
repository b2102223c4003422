// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The RAM staging area an update transaction is built up in.
//!
//! Exclusively owned by [`crate::protocol::run_update`] for the lifetime of
//! one transaction; the dispatch loop hands a `&mut StagingBuffer` in and
//! gets it back when the call returns, successfully or not.

use crate::layout::{MSG_MAX, STAGING_SIZE};

pub struct StagingBuffer {
    /// Firmware bytes, then (transiently) trailing frame metadata, then (at
    /// commit time) firmware metadata and the release message.
    pub bytes: [u8; STAGING_SIZE],
    /// The release message, read separately before being folded into
    /// `bytes` for the combined authenticator.
    pub msg_buf: [u8; MSG_MAX],
}

impl StagingBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; STAGING_SIZE],
            msg_buf: [0u8; MSG_MAX],
        }
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
