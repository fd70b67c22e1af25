//! Instruction disassembly.
//!
//! Decoding goes through the same opcode table as the interpreter. Operand
//! length of immediate forms depends on the `M`/`X` widths, which the caller
//! supplies; [`disassemble_window`] additionally follows `REP`/`SEP` inside
//! the window so straight-line code after a width switch decodes correctly.

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::fmt;

use crate::encoding::{decode_opcode, AddressingMode, Mnemonic};
use crate::state::{FLAG_M, FLAG_X};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// 24-bit address of the opcode byte.
    pub addr: u32,
    /// Instruction length in bytes, opcode included (1..=4).
    pub len: u8,
    /// Raw instruction bytes.
    pub bytes: Vec<u8>,
    /// Upper-case mnemonic, e.g. `LDA`.
    pub mnemonic: String,
    /// Formatted operand, e.g. `#$01` or `($10),Y`. Empty for implied forms.
    pub operands: String,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self
            .bytes
            .iter()
            .map(|byte| format!("{byte:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            f,
            "{:02X}:{:04X}  {hex:<11} {}",
            self.addr >> 16,
            self.addr & 0xFFFF,
            self.mnemonic
        )?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands)?;
        }
        Ok(())
    }
}

/// Disassembles the instruction at `addr`.
///
/// `peek` must be free of side effects; `m8`/`x8` select the immediate
/// operand widths. Operand bytes are read within the program bank.
pub fn disassemble_one(peek: impl Fn(u32) -> u8, addr: u32, m8: bool, x8: bool) -> DisassemblyRow {
    let addr = addr & 0x00FF_FFFF;
    let opcode = peek(addr);
    let entry = decode_opcode(opcode);
    let len = 1 + entry.mode.operand_len(m8, x8);

    let bytes: Vec<u8> = (0..u16::from(len))
        .map(|offset| peek(bank_offset(addr, offset)))
        .collect();
    let operands = format_operands(entry.mode, addr, &bytes[1..]);

    DisassemblyRow {
        addr,
        len,
        bytes,
        mnemonic: entry.mnemonic.name().to_string(),
        operands,
    }
}

/// Disassembles `count` consecutive instructions starting at `addr`.
///
/// `REP`/`SEP` immediates update the assumed widths for later rows.
pub fn disassemble_window(
    peek: impl Fn(u32) -> u8,
    addr: u32,
    count: usize,
    m8: bool,
    x8: bool,
) -> Vec<DisassemblyRow> {
    let mut rows = Vec::with_capacity(count);
    let (mut m8, mut x8) = (m8, x8);
    let mut addr = addr & 0x00FF_FFFF;

    for _ in 0..count {
        let row = disassemble_one(&peek, addr, m8, x8);
        let entry = decode_opcode(row.bytes[0]);
        if let Some(&mask) = row.bytes.get(1) {
            match entry.mnemonic {
                Mnemonic::Rep => {
                    m8 &= mask & FLAG_M == 0;
                    x8 &= mask & FLAG_X == 0;
                }
                Mnemonic::Sep => {
                    m8 |= mask & FLAG_M != 0;
                    x8 |= mask & FLAG_X != 0;
                }
                _ => {}
            }
        }
        addr = bank_offset(addr, u16::from(row.len));
        rows.push(row);
    }

    rows
}

const fn bank_offset(addr: u32, offset: u16) -> u32 {
    (addr & 0xFF_0000) | ((addr as u16).wrapping_add(offset) as u32)
}

fn format_operands(mode: AddressingMode, addr: u32, operand: &[u8]) -> String {
    let byte = || operand.first().copied().unwrap_or(0);
    let word = || u16::from_le_bytes([byte(), operand.get(1).copied().unwrap_or(0)]);
    let long = || (u32::from(operand.get(2).copied().unwrap_or(0)) << 16) | u32::from(word());
    let pc = addr as u16;

    match mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Accumulator => "A".to_string(),
        AddressingMode::Immediate | AddressingMode::ImmediateIndex => {
            if operand.len() == 1 {
                format!("#${:02X}", byte())
            } else {
                format!("#${:04X}", word())
            }
        }
        AddressingMode::Immediate8 => format!("#${:02X}", byte()),
        AddressingMode::Relative8 => {
            let dest = pc.wrapping_add(2).wrapping_add_signed(i16::from(byte() as i8));
            format!("${dest:04X}")
        }
        AddressingMode::Relative16 => {
            let dest = pc.wrapping_add(3).wrapping_add(word());
            format!("${dest:04X}")
        }
        AddressingMode::Direct => format!("${:02X}", byte()),
        AddressingMode::DirectX => format!("${:02X},X", byte()),
        AddressingMode::DirectY => format!("${:02X},Y", byte()),
        AddressingMode::DirectIndirect => format!("(${:02X})", byte()),
        AddressingMode::DirectIndirectLong => format!("[${:02X}]", byte()),
        AddressingMode::DirectXIndirect => format!("(${:02X},X)", byte()),
        AddressingMode::DirectIndirectY => format!("(${:02X}),Y", byte()),
        AddressingMode::DirectIndirectLongY => format!("[${:02X}],Y", byte()),
        AddressingMode::Absolute => format!("${:04X}", word()),
        AddressingMode::AbsoluteX => format!("${:04X},X", word()),
        AddressingMode::AbsoluteY => format!("${:04X},Y", word()),
        AddressingMode::AbsoluteLong => format!("${:06X}", long()),
        AddressingMode::AbsoluteLongX => format!("${:06X},X", long()),
        AddressingMode::StackRelative => format!("${:02X},S", byte()),
        AddressingMode::StackRelativeIndirectY => format!("(${:02X},S),Y", byte()),
        AddressingMode::AbsoluteIndirect => format!("(${:04X})", word()),
        AddressingMode::AbsoluteIndirectLong => format!("[${:04X}]", word()),
        AddressingMode::AbsoluteXIndirect => format!("(${:04X},X)", word()),
        // Encoded destination first; written source first.
        AddressingMode::BlockMove => {
            let dest = byte();
            let source = operand.get(1).copied().unwrap_or(0);
            format!("${source:02X},${dest:02X}")
        }
    }
}
