// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! In-memory fakes for `Channel` and `RawFlash`, used by this crate's own
//! test suite. Exposed (not test-gated) so integration tests under `tests/`
//! and downstream crates' tests can reuse them.

extern crate std;

use std::vec::Vec;

use crate::channel::{Channel, ChannelError};
use crate::flash::{FlashError, RawFlash};

/// A channel backed by a fixed input queue and a growable output log.
#[derive(Default)]
pub struct FakeChannel {
    input: Vec<u8>,
    pos: usize,
    pub output: Vec<u8>,
}

impl FakeChannel {
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.to_vec(),
            pos: 0,
            output: Vec::new(),
        }
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend_from_slice(bytes);
    }
}

impl Channel for FakeChannel {
    fn read_byte(&mut self) -> Result<u8, ChannelError> {
        if self.pos >= self.input.len() {
            return Err(ChannelError);
        }
        let b = self.input[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }
}

/// A RAM-backed stand-in for on-chip flash: plain bytes, `0xFF`-initialized,
/// with an erase/program record for assertions about unintended writes.
pub struct FakeFlash {
    pub mem: Vec<u8>,
    pub erase_count: usize,
    pub program_count: usize,
    pub fail_after: Option<usize>,
}

impl FakeFlash {
    pub fn new(size: usize) -> Self {
        Self {
            mem: std::vec![0xFFu8; size],
            erase_count: 0,
            program_count: 0,
            fail_after: None,
        }
    }

    pub fn read(&self, addr: u32, len: usize) -> &[u8] {
        let addr = addr as usize;
        &self.mem[addr..addr + len]
    }
}

impl RawFlash for FakeFlash {
    fn erase_page(&mut self, page_addr: u32) -> Result<(), FlashError> {
        self.erase_count += 1;
        if let Some(budget) = self.fail_after {
            if self.erase_count + self.program_count > budget {
                return Err(FlashError);
            }
        }
        let addr = page_addr as usize;
        let page = crate::layout::PAGE;
        for b in &mut self.mem[addr..addr + page] {
            *b = 0xFF;
        }
        Ok(())
    }

    fn write_word(&mut self, addr: u32, word: [u8; 4]) -> Result<(), FlashError> {
        self.program_count += 1;
        if let Some(budget) = self.fail_after {
            if self.erase_count + self.program_count > budget {
                return Err(FlashError);
            }
        }
        let addr = addr as usize;
        self.mem[addr..addr + 4].copy_from_slice(&word);
        Ok(())
    }
}
