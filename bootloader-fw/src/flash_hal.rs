// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash erase/program via RP2040 boot-ROM routines, implementing
//! [`bootloader_core::RawFlash`].
//!
//! On RP2040, flash erase/program requires disabling XIP first. The full
//! sequence is:
//!   1. connect_internal_flash()
//!   2. flash_exit_xip()
//!   3. flash_range_erase() or flash_range_program()
//!   4. flash_flush_cache()
//!   5. flash_enter_cmd_xip()
//!
//! All code executing during steps 1-5 must run from RAM, not flash. We use
//! `#[link_section = ".data"]` to place those functions in RAM and
//! pre-resolve all ROM function pointers at init time, matched against the
//! RP2040's two-character ROM function tags.
//!
//! The hardware's minimum erase granularity (4 KiB) is larger than a
//! protocol page (1 KiB), so [`RpFlash`] only erases the sector backing a
//! page the first time that sector is touched in a transaction; later pages
//! landing in the same sector skip the redundant erase so they don't wipe
//! out data this same commit already wrote.

use bootloader_core::{FlashError, RawFlash};

use crate::consts::{FLASH_BASE, FLASH_SECTOR_SIZE};

type RomFnVoid = unsafe extern "C" fn();
type RomFnErase = unsafe extern "C" fn(u32, usize, u32, u8);
type RomFnProgram = unsafe extern "C" fn(u32, *const u8, usize);

static mut ROM_CONNECT_INTERNAL_FLASH: RomFnVoid = dummy_void;
static mut ROM_FLASH_EXIT_XIP: RomFnVoid = dummy_void;
static mut ROM_FLASH_RANGE_ERASE: RomFnErase = dummy_erase;
static mut ROM_FLASH_RANGE_PROGRAM: RomFnProgram = dummy_program;
static mut ROM_FLASH_FLUSH_CACHE: RomFnVoid = dummy_void;
static mut ROM_FLASH_ENTER_CMD_XIP: RomFnVoid = dummy_void;

unsafe extern "C" fn dummy_void() {}
unsafe extern "C" fn dummy_erase(_: u32, _: usize, _: u32, _: u8) {}
unsafe extern "C" fn dummy_program(_: u32, _: *const u8, _: usize) {}

/// ROM table pointer at 0x14 and lookup function at 0x18 are 16-bit halfword pointers.
unsafe fn rom_func_lookup(tag: &[u8; 2]) -> usize {
    let fn_table = *(0x14 as *const u16) as *const u16;
    let lookup: unsafe extern "C" fn(*const u16, u32) -> usize =
        core::mem::transmute::<usize, unsafe extern "C" fn(*const u16, u32) -> usize>(
            *(0x18 as *const u16) as usize,
        );
    let code = u16::from_le_bytes(*tag) as u32;
    lookup(fn_table, code)
}

/// Resolve ROM flash function pointers. Must run once before any `RpFlash` use.
pub fn init() {
    unsafe {
        ROM_CONNECT_INTERNAL_FLASH = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"IF"));
        ROM_FLASH_EXIT_XIP = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"EX"));
        ROM_FLASH_RANGE_ERASE = core::mem::transmute::<usize, RomFnErase>(rom_func_lookup(b"RE"));
        ROM_FLASH_RANGE_PROGRAM =
            core::mem::transmute::<usize, RomFnProgram>(rom_func_lookup(b"RP"));
        ROM_FLASH_FLUSH_CACHE = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"FC"));
        ROM_FLASH_ENTER_CMD_XIP = core::mem::transmute::<usize, RomFnVoid>(rom_func_lookup(b"CX"));
    }
}

fn addr_to_offset(abs_addr: u32) -> u32 {
    abs_addr - FLASH_BASE
}

fn sector_of(offset: u32) -> u32 {
    offset - (offset % FLASH_SECTOR_SIZE)
}

#[link_section = ".data"]
#[inline(never)]
unsafe fn rom_erase(offset: u32, size: u32) {
    cortex_m::interrupt::disable();
    ROM_CONNECT_INTERNAL_FLASH();
    ROM_FLASH_EXIT_XIP();
    ROM_FLASH_RANGE_ERASE(offset, size as usize, FLASH_SECTOR_SIZE, 0x20);
    ROM_FLASH_FLUSH_CACHE();
    ROM_FLASH_ENTER_CMD_XIP();
    cortex_m::interrupt::enable();
}

#[link_section = ".data"]
#[inline(never)]
unsafe fn rom_program(offset: u32, data: *const u8, len: usize) {
    cortex_m::interrupt::disable();
    ROM_CONNECT_INTERNAL_FLASH();
    ROM_FLASH_EXIT_XIP();
    ROM_FLASH_RANGE_PROGRAM(offset, data, len);
    ROM_FLASH_FLUSH_CACHE();
    ROM_FLASH_ENTER_CMD_XIP();
    cortex_m::interrupt::enable();
}

/// Read bytes from an absolute XIP flash address via volatile reads. Never
/// routed through the ROM erase/program path; ordinary flash reads are safe
/// at any time.
pub fn read(abs_addr: u32, buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = unsafe { ((abs_addr + i as u32) as *const u8).read_volatile() };
    }
}

/// `RawFlash` implementation with per-transaction sector-erase memoization.
pub struct RpFlash {
    last_erased_sector: Option<u32>,
}

impl RpFlash {
    pub const fn new() -> Self {
        Self {
            last_erased_sector: None,
        }
    }

    /// Forget which sector was last erased, so the next `erase_page` call
    /// always erases. Call once at the start of each update transaction.
    pub fn begin_transaction(&mut self) {
        self.last_erased_sector = None;
    }
}

impl RawFlash for RpFlash {
    fn erase_page(&mut self, page_addr: u32) -> Result<(), FlashError> {
        let offset = addr_to_offset(page_addr);
        let sector = sector_of(offset);
        if self.last_erased_sector == Some(sector) {
            return Ok(());
        }
        unsafe {
            rom_erase(sector, FLASH_SECTOR_SIZE);
        }
        self.last_erased_sector = Some(sector);
        Ok(())
    }

    fn write_word(&mut self, addr: u32, word: [u8; 4]) -> Result<(), FlashError> {
        let offset = addr_to_offset(addr);
        unsafe {
            rom_program(offset, word.as_ptr(), word.len());
        }
        Ok(())
    }
}
