//! Deterministic run fingerprint used for cross-host comparison.
//!
//! Boots a small native-mode program that fills work RAM and counts NMIs,
//! runs a few frames, then hashes registers, cycle count and work RAM.

use log as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use snes_core::{Machine, MachineConfig, MappingScheme};
use thiserror as _;

const FRAMES: usize = 3;

const PROGRAM: &[u8] = &[
    0x18, // CLC
    0xFB, // XCE
    0xC2, 0x30, // REP #$30
    0xA2, 0x00, 0x00, // LDX #$0000
    0x8A, // TXA
    0x9F, 0x00, 0x00, 0x7E, // STA $7E0000,X
    0xE8, // INX
    0xE8, // INX
    0xE0, 0x00, 0x02, // CPX #$0200
    0xD0, 0xF4, // BNE -12
    0xCB, // WAI
    0x80, 0xFD, // BRA -3
];

const NMI_HANDLER: &[u8] = &[
    0xEE, 0x00, 0x02, // INC $0200
    0x40, // RTI
];

fn cartridge() -> Vec<u8> {
    let mut rom = vec![0xEA; 0x8000];
    rom[..PROGRAM.len()].copy_from_slice(PROGRAM);
    rom[0x1000..0x1000 + NMI_HANDLER.len()].copy_from_slice(NMI_HANDLER);
    rom[0x7FEA..0x7FEC].copy_from_slice(&0x9000_u16.to_le_bytes());
    rom[0x7FFC..0x7FFE].copy_from_slice(&0x8000_u16.to_le_bytes());
    rom
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut machine = Machine::new(MachineConfig {
        scheme_override: Some(MappingScheme::LoRom),
        ..MachineConfig::default()
    });
    machine.load_cartridge(&cartridge());
    machine.reset();

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for _ in 0..FRAMES {
        let frame = machine.run_frame(true);
        hash_bytes(&mut hash, &frame.steps.to_le_bytes());
        hash_bytes(&mut hash, &frame.cycles.to_le_bytes());
    }

    let cpu = machine.cpu();
    let regs = cpu.registers();
    for word in [regs.a(), regs.x(), regs.y(), regs.s(), regs.d(), regs.pc()] {
        hash_bytes(&mut hash, &word.to_le_bytes());
    }
    hash_bytes(&mut hash, &[regs.p(), regs.pbr(), regs.dbr(), u8::from(regs.emulation())]);
    hash_bytes(&mut hash, &cpu.cycles().to_le_bytes());
    hash_bytes(&mut hash, machine.bus().work_ram());

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
