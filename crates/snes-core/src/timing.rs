//! Published per-opcode cycle counts.
//!
//! Reference conditions: native mode, `M = X = 1`, direct page low byte 0,
//! no index page crossing, branches not taken. The interpreter derives its
//! cycle counts from bus and idle cycles; this table is the reference those
//! counts are checked against.

/// Base cycle count for every opcode under the reference conditions.
#[rustfmt::skip]
pub const BASE_CYCLE_TABLE: [u8; 256] = [
    // 0x00
    8, 6, 8, 4, 5, 3, 5, 6, 3, 2, 2, 4, 6, 4, 6, 5,
    // 0x10
    2, 5, 5, 7, 5, 4, 6, 6, 2, 4, 2, 2, 6, 4, 7, 5,
    // 0x20
    6, 6, 8, 4, 3, 3, 5, 6, 4, 2, 2, 5, 4, 4, 6, 5,
    // 0x30
    2, 5, 5, 7, 4, 4, 6, 6, 2, 4, 2, 2, 4, 4, 7, 5,
    // 0x40
    7, 6, 2, 4, 7, 3, 5, 6, 3, 2, 2, 3, 3, 4, 6, 5,
    // 0x50
    2, 5, 5, 7, 7, 4, 6, 6, 2, 4, 3, 2, 4, 4, 7, 5,
    // 0x60
    6, 6, 6, 4, 3, 3, 5, 6, 4, 2, 2, 6, 5, 4, 6, 5,
    // 0x70
    2, 5, 5, 7, 4, 4, 6, 6, 2, 4, 4, 2, 6, 4, 7, 5,
    // 0x80
    3, 6, 4, 4, 3, 3, 3, 6, 2, 2, 2, 3, 4, 4, 4, 5,
    // 0x90
    2, 6, 5, 7, 4, 4, 4, 6, 2, 5, 2, 2, 4, 5, 5, 5,
    // 0xA0
    2, 6, 2, 4, 3, 3, 3, 6, 2, 2, 2, 4, 4, 4, 4, 5,
    // 0xB0
    2, 5, 5, 7, 4, 4, 4, 6, 2, 4, 2, 2, 4, 4, 4, 5,
    // 0xC0
    2, 6, 3, 4, 3, 3, 5, 6, 2, 2, 2, 3, 4, 4, 6, 5,
    // 0xD0
    2, 5, 5, 7, 6, 4, 6, 6, 2, 4, 3, 3, 6, 4, 7, 5,
    // 0xE0
    2, 6, 3, 4, 3, 3, 5, 6, 2, 2, 2, 3, 4, 4, 6, 5,
    // 0xF0
    2, 5, 5, 7, 5, 4, 6, 6, 2, 4, 4, 2, 8, 4, 7, 5,
];

/// Cycles charged for servicing a hardware interrupt (NMI or IRQ).
pub const INTERRUPT_ENTRY_CYCLES: u32 = 7;

/// Cycles per byte transferred by `MVN`/`MVP`.
pub const BLOCK_MOVE_CYCLES_PER_BYTE: u32 = 7;

/// Looks up the reference cycle count for an opcode.
#[must_use]
pub const fn base_cycles(opcode: u8) -> u8 {
    BASE_CYCLE_TABLE[opcode as usize]
}
