// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Secure firmware-update bootloader for RP2040.
//!
//! At power-on, provisions the factory image if flash is blank, then idles
//! waiting for a single command byte from the host: `U` starts an update,
//! `B` boots the installed firmware.

#![no_std]
#![no_main]

mod boot;
mod channel_hal;
mod consts;
mod factory;
mod flash_hal;
mod peripherals;

use bootloader_core::{
    run_update, Channel, FirmwareMetadata, FlashRegion, StagingBuffer, Verifier, Writer,
};
use bootloader_core::layout::PAGE;
use core::fmt::Write as _;
use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;

defmt::timestamp!("{=u64:us}", { 0 });

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

const CMD_UPDATE: u8 = b'U';
const CMD_BOOT: u8 = b'B';

#[entry]
fn main() -> ! {
    defmt::println!("bootloader init");

    let mut p = peripherals::init();
    peripherals::blink(&mut p.led_pin, &mut p.timer, 3, 200);
    flash_hal::init();

    provision_factory_image_if_blank();

    p.debug.write_str("bootloader ready\n");

    let verifier = Verifier::new(consts::HMAC_KEY, consts::AES_KEY);
    let mut staging = StagingBuffer::new();

    loop {
        let Ok(cmd) = p.host.read_byte() else {
            continue;
        };

        match cmd {
            CMD_UPDATE => {
                p.host.write_byte(CMD_UPDATE);
                p.debug.write_str("update requested\n");

                let stored = read_stored_metadata();
                let mut flash = flash_hal::RpFlash::new();
                flash.begin_transaction();

                match run_update(
                    &mut p.host,
                    &mut p.debug,
                    &mut flash,
                    &verifier,
                    &consts::LAYOUT,
                    stored.version,
                    &mut staging,
                ) {
                    Ok(committed) => {
                        defmt::println!("update committed, version={}", committed.version);
                    }
                    Err(e) => {
                        let _ = write!(Writer(&mut p.debug), "{e}\n");
                        defmt::println!("update aborted");
                        p.host.write_byte(bootloader_core::ERROR);
                        reset();
                    }
                }
            }
            CMD_BOOT => {
                p.host.write_byte(CMD_BOOT);
                let stored = read_stored_metadata();
                let mut msg = [0u8; bootloader_core::layout::MSG_MAX];
                let msg_size = stored.release_msg_size as usize;
                flash_hal::read(consts::MSG_ADDR, &mut msg[..msg_size]);
                p.debug.write_bytes(&msg[..msg_size]);

                unsafe { boot::boot_to(consts::FW_ADDR) }
            }
            _ => {}
        }
    }
}

fn read_stored_metadata() -> FirmwareMetadata {
    let mut bytes = [0u8; 6];
    flash_hal::read(consts::META_ADDR, &mut bytes);
    FirmwareMetadata::parse(&bytes)
}

/// Flash reads as all-`0xFF` after erase; only provision the factory image
/// the very first time the device boots.
fn provision_factory_image_if_blank() {
    let mut probe = [0u8; 4];
    flash_hal::read(consts::META_ADDR, &mut probe);
    if probe != [0xFF; 4] {
        return;
    }

    let mut flash = flash_hal::RpFlash::new();
    flash.begin_transaction();
    let mut region = FlashRegion::new(&mut flash);

    let image = factory::FACTORY_IMAGE;
    let mut off = 0usize;
    while off < image.len() {
        let len = core::cmp::min(PAGE, image.len() - off);
        region
            .program(consts::FW_ADDR + off as u32, &image[off..off + len])
            .expect("factory image program");
        off += PAGE;
    }

    let metadata = FirmwareMetadata {
        version: factory::FACTORY_VERSION,
        fw_size: image.len() as u16,
        release_msg_size: factory::FACTORY_MESSAGE.len() as u16,
    };
    region
        .program(consts::MSG_ADDR, factory::FACTORY_MESSAGE)
        .expect("factory message program");
    region
        .program(consts::META_ADDR, &metadata.to_bytes())
        .expect("factory metadata program");
}

fn reset() -> ! {
    cortex_m::peripheral::SCB::sys_reset()
}
