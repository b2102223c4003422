// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The boot trampoline: relocate the vector table to the firmware image and
//! jump. Firmware executes in place from flash (XIP); there is no RAM copy
//! and no bank selection — the update protocol already guaranteed the image
//! at `FW_ADDR` is the one and only valid image.

struct VectorTable {
    initial_sp: u32,
    reset_vector: u32,
}

impl VectorTable {
    unsafe fn read_from(addr: u32) -> Self {
        Self {
            initial_sp: (addr as *const u32).read_volatile(),
            reset_vector: (addr as *const u32).offset(1).read_volatile(),
        }
    }
}

/// Disable interrupts and NVIC state so the firmware's own runtime can
/// initialize cleanly, relocate the vector table to `addr`, and jump. Does
/// not return.
///
/// # Safety
/// `addr` must point to a valid Cortex-M vector table in flash.
pub unsafe fn boot_to(addr: u32) -> ! {
    prepare_for_firmware_handoff();

    const SCB_VTOR: *mut u32 = 0xE000_ED08 as *mut u32;
    SCB_VTOR.write_volatile(addr);
    cortex_m::asm::dsb();
    cortex_m::asm::isb();

    let vt = VectorTable::read_from(addr);
    jump_to_firmware(vt.initial_sp, vt.reset_vector);
}

unsafe fn prepare_for_firmware_handoff() {
    cortex_m::interrupt::disable();

    const NVIC_ICPR: *mut u32 = 0xE000_E280 as *mut u32;
    NVIC_ICPR.write_volatile(0xFFFF_FFFF);

    const NVIC_ICER: *mut u32 = 0xE000_E180 as *mut u32;
    NVIC_ICER.write_volatile(0xFFFF_FFFF);
}

unsafe fn jump_to_firmware(initial_sp: u32, reset_vector: u32) -> ! {
    core::arch::asm!(
        "msr msp, {sp}",
        "cpsie i",
        "bx {reset}",
        sp = in(reg) initial_sp,
        reset = in(reg) reset_vector,
        options(noreturn)
    );
}
