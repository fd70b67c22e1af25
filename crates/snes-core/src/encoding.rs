//! Opcode map: mnemonic and addressing mode for all 256 opcodes.
//!
//! The interpreter and the disassembler both decode through
//! [`OPCODE_TABLE`], so every byte value names exactly one instruction.

/// Instruction mnemonics of the 65C816.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Bra,
    Brk,
    Brl,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cop,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jml,
    Jmp,
    Jsl,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Mvn,
    Mvp,
    Nop,
    Ora,
    Pea,
    Pei,
    Per,
    Pha,
    Phb,
    Phd,
    Phk,
    Php,
    Phx,
    Phy,
    Pla,
    Plb,
    Pld,
    Plp,
    Plx,
    Ply,
    Rep,
    Rol,
    Ror,
    Rti,
    Rtl,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sep,
    Sta,
    Stp,
    Stx,
    Sty,
    Stz,
    Tax,
    Tay,
    Tcd,
    Tcs,
    Tdc,
    Trb,
    Tsb,
    Tsc,
    Tsx,
    Txa,
    Txs,
    Txy,
    Tya,
    Tyx,
    Wai,
    Wdm,
    Xba,
    Xce,
}

impl Mnemonic {
    /// Upper-case assembler name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC",
            Self::And => "AND",
            Self::Asl => "ASL",
            Self::Bcc => "BCC",
            Self::Bcs => "BCS",
            Self::Beq => "BEQ",
            Self::Bit => "BIT",
            Self::Bmi => "BMI",
            Self::Bne => "BNE",
            Self::Bpl => "BPL",
            Self::Bra => "BRA",
            Self::Brk => "BRK",
            Self::Brl => "BRL",
            Self::Bvc => "BVC",
            Self::Bvs => "BVS",
            Self::Clc => "CLC",
            Self::Cld => "CLD",
            Self::Cli => "CLI",
            Self::Clv => "CLV",
            Self::Cmp => "CMP",
            Self::Cop => "COP",
            Self::Cpx => "CPX",
            Self::Cpy => "CPY",
            Self::Dec => "DEC",
            Self::Dex => "DEX",
            Self::Dey => "DEY",
            Self::Eor => "EOR",
            Self::Inc => "INC",
            Self::Inx => "INX",
            Self::Iny => "INY",
            Self::Jml => "JML",
            Self::Jmp => "JMP",
            Self::Jsl => "JSL",
            Self::Jsr => "JSR",
            Self::Lda => "LDA",
            Self::Ldx => "LDX",
            Self::Ldy => "LDY",
            Self::Lsr => "LSR",
            Self::Mvn => "MVN",
            Self::Mvp => "MVP",
            Self::Nop => "NOP",
            Self::Ora => "ORA",
            Self::Pea => "PEA",
            Self::Pei => "PEI",
            Self::Per => "PER",
            Self::Pha => "PHA",
            Self::Phb => "PHB",
            Self::Phd => "PHD",
            Self::Phk => "PHK",
            Self::Php => "PHP",
            Self::Phx => "PHX",
            Self::Phy => "PHY",
            Self::Pla => "PLA",
            Self::Plb => "PLB",
            Self::Pld => "PLD",
            Self::Plp => "PLP",
            Self::Plx => "PLX",
            Self::Ply => "PLY",
            Self::Rep => "REP",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::Rti => "RTI",
            Self::Rtl => "RTL",
            Self::Rts => "RTS",
            Self::Sbc => "SBC",
            Self::Sec => "SEC",
            Self::Sed => "SED",
            Self::Sei => "SEI",
            Self::Sep => "SEP",
            Self::Sta => "STA",
            Self::Stp => "STP",
            Self::Stx => "STX",
            Self::Sty => "STY",
            Self::Stz => "STZ",
            Self::Tax => "TAX",
            Self::Tay => "TAY",
            Self::Tcd => "TCD",
            Self::Tcs => "TCS",
            Self::Tdc => "TDC",
            Self::Trb => "TRB",
            Self::Tsb => "TSB",
            Self::Tsc => "TSC",
            Self::Tsx => "TSX",
            Self::Txa => "TXA",
            Self::Txs => "TXS",
            Self::Txy => "TXY",
            Self::Tya => "TYA",
            Self::Tyx => "TYX",
            Self::Wai => "WAI",
            Self::Wdm => "WDM",
            Self::Xba => "XBA",
            Self::Xce => "XCE",
        }
    }

    /// Returns `true` for index-register instructions whose immediate and
    /// memory operands follow the `X` width.
    #[must_use]
    pub const fn uses_index_width(self) -> bool {
        matches!(
            self,
            Self::Ldx | Self::Ldy | Self::Stx | Self::Sty | Self::Cpx | Self::Cpy
        )
    }
}

/// Operand addressing modes as they appear in the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand.
    Implied,
    /// Operates on the accumulator.
    Accumulator,
    /// Immediate operand sized by `M`.
    Immediate,
    /// Immediate operand sized by `X`.
    ImmediateIndex,
    /// One-byte immediate (`REP`, `SEP`) or signature byte (`BRK`, `COP`, `WDM`).
    Immediate8,
    /// Signed 8-bit branch displacement.
    Relative8,
    /// Signed 16-bit displacement (`BRL`, `PER`).
    Relative16,
    /// `dp`
    Direct,
    /// `dp,X`
    DirectX,
    /// `dp,Y`
    DirectY,
    /// `(dp)`
    DirectIndirect,
    /// `[dp]`
    DirectIndirectLong,
    /// `(dp,X)`
    DirectXIndirect,
    /// `(dp),Y`
    DirectIndirectY,
    /// `[dp],Y`
    DirectIndirectLongY,
    /// `abs`
    Absolute,
    /// `abs,X`
    AbsoluteX,
    /// `abs,Y`
    AbsoluteY,
    /// `long`
    AbsoluteLong,
    /// `long,X`
    AbsoluteLongX,
    /// `sr,S`
    StackRelative,
    /// `(sr,S),Y`
    StackRelativeIndirectY,
    /// `(abs)` jump target.
    AbsoluteIndirect,
    /// `[abs]` jump target.
    AbsoluteIndirectLong,
    /// `(abs,X)` jump target.
    AbsoluteXIndirect,
    /// Source and destination bank bytes of `MVN`/`MVP`.
    BlockMove,
}

impl AddressingMode {
    /// Number of operand bytes after the opcode for the given widths.
    #[must_use]
    pub const fn operand_len(self, m8: bool, x8: bool) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate => {
                if m8 {
                    1
                } else {
                    2
                }
            }
            Self::ImmediateIndex => {
                if x8 {
                    1
                } else {
                    2
                }
            }
            Self::Immediate8
            | Self::Relative8
            | Self::Direct
            | Self::DirectX
            | Self::DirectY
            | Self::DirectIndirect
            | Self::DirectIndirectLong
            | Self::DirectXIndirect
            | Self::DirectIndirectY
            | Self::DirectIndirectLongY
            | Self::StackRelative
            | Self::StackRelativeIndirectY => 1,
            Self::Relative16
            | Self::Absolute
            | Self::AbsoluteX
            | Self::AbsoluteY
            | Self::AbsoluteIndirect
            | Self::AbsoluteIndirectLong
            | Self::AbsoluteXIndirect
            | Self::BlockMove => 2,
            Self::AbsoluteLong | Self::AbsoluteLongX => 3,
        }
    }

    /// Returns `true` for modes that index through the direct page.
    #[must_use]
    pub const fn is_direct_page(self) -> bool {
        matches!(
            self,
            Self::Direct
                | Self::DirectX
                | Self::DirectY
                | Self::DirectIndirect
                | Self::DirectIndirectLong
                | Self::DirectXIndirect
                | Self::DirectIndirectY
                | Self::DirectIndirectLongY
        )
    }
}

/// Decoded opcode entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,
    /// Operand addressing mode.
    pub mode: AddressingMode,
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode) -> Opcode {
    Opcode { mnemonic, mode }
}

/// Opcode map indexed by the opcode byte.
pub const OPCODE_TABLE: [Opcode; 256] = [
    // 0x00
    op(Mnemonic::Brk, AddressingMode::Immediate8),
    op(Mnemonic::Ora, AddressingMode::DirectXIndirect),
    op(Mnemonic::Cop, AddressingMode::Immediate8),
    op(Mnemonic::Ora, AddressingMode::StackRelative),
    op(Mnemonic::Tsb, AddressingMode::Direct),
    op(Mnemonic::Ora, AddressingMode::Direct),
    op(Mnemonic::Asl, AddressingMode::Direct),
    op(Mnemonic::Ora, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Php, AddressingMode::Implied),
    op(Mnemonic::Ora, AddressingMode::Immediate),
    op(Mnemonic::Asl, AddressingMode::Accumulator),
    op(Mnemonic::Phd, AddressingMode::Implied),
    op(Mnemonic::Tsb, AddressingMode::Absolute),
    op(Mnemonic::Ora, AddressingMode::Absolute),
    op(Mnemonic::Asl, AddressingMode::Absolute),
    op(Mnemonic::Ora, AddressingMode::AbsoluteLong),
    // 0x10
    op(Mnemonic::Bpl, AddressingMode::Relative8),
    op(Mnemonic::Ora, AddressingMode::DirectIndirectY),
    op(Mnemonic::Ora, AddressingMode::DirectIndirect),
    op(Mnemonic::Ora, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Trb, AddressingMode::Direct),
    op(Mnemonic::Ora, AddressingMode::DirectX),
    op(Mnemonic::Asl, AddressingMode::DirectX),
    op(Mnemonic::Ora, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Clc, AddressingMode::Implied),
    op(Mnemonic::Ora, AddressingMode::AbsoluteY),
    op(Mnemonic::Inc, AddressingMode::Accumulator),
    op(Mnemonic::Tcs, AddressingMode::Implied),
    op(Mnemonic::Trb, AddressingMode::Absolute),
    op(Mnemonic::Ora, AddressingMode::AbsoluteX),
    op(Mnemonic::Asl, AddressingMode::AbsoluteX),
    op(Mnemonic::Ora, AddressingMode::AbsoluteLongX),
    // 0x20
    op(Mnemonic::Jsr, AddressingMode::Absolute),
    op(Mnemonic::And, AddressingMode::DirectXIndirect),
    op(Mnemonic::Jsl, AddressingMode::AbsoluteLong),
    op(Mnemonic::And, AddressingMode::StackRelative),
    op(Mnemonic::Bit, AddressingMode::Direct),
    op(Mnemonic::And, AddressingMode::Direct),
    op(Mnemonic::Rol, AddressingMode::Direct),
    op(Mnemonic::And, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Plp, AddressingMode::Implied),
    op(Mnemonic::And, AddressingMode::Immediate),
    op(Mnemonic::Rol, AddressingMode::Accumulator),
    op(Mnemonic::Pld, AddressingMode::Implied),
    op(Mnemonic::Bit, AddressingMode::Absolute),
    op(Mnemonic::And, AddressingMode::Absolute),
    op(Mnemonic::Rol, AddressingMode::Absolute),
    op(Mnemonic::And, AddressingMode::AbsoluteLong),
    // 0x30
    op(Mnemonic::Bmi, AddressingMode::Relative8),
    op(Mnemonic::And, AddressingMode::DirectIndirectY),
    op(Mnemonic::And, AddressingMode::DirectIndirect),
    op(Mnemonic::And, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Bit, AddressingMode::DirectX),
    op(Mnemonic::And, AddressingMode::DirectX),
    op(Mnemonic::Rol, AddressingMode::DirectX),
    op(Mnemonic::And, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Sec, AddressingMode::Implied),
    op(Mnemonic::And, AddressingMode::AbsoluteY),
    op(Mnemonic::Dec, AddressingMode::Accumulator),
    op(Mnemonic::Tsc, AddressingMode::Implied),
    op(Mnemonic::Bit, AddressingMode::AbsoluteX),
    op(Mnemonic::And, AddressingMode::AbsoluteX),
    op(Mnemonic::Rol, AddressingMode::AbsoluteX),
    op(Mnemonic::And, AddressingMode::AbsoluteLongX),
    // 0x40
    op(Mnemonic::Rti, AddressingMode::Implied),
    op(Mnemonic::Eor, AddressingMode::DirectXIndirect),
    op(Mnemonic::Wdm, AddressingMode::Immediate8),
    op(Mnemonic::Eor, AddressingMode::StackRelative),
    op(Mnemonic::Mvp, AddressingMode::BlockMove),
    op(Mnemonic::Eor, AddressingMode::Direct),
    op(Mnemonic::Lsr, AddressingMode::Direct),
    op(Mnemonic::Eor, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Pha, AddressingMode::Implied),
    op(Mnemonic::Eor, AddressingMode::Immediate),
    op(Mnemonic::Lsr, AddressingMode::Accumulator),
    op(Mnemonic::Phk, AddressingMode::Implied),
    op(Mnemonic::Jmp, AddressingMode::Absolute),
    op(Mnemonic::Eor, AddressingMode::Absolute),
    op(Mnemonic::Lsr, AddressingMode::Absolute),
    op(Mnemonic::Eor, AddressingMode::AbsoluteLong),
    // 0x50
    op(Mnemonic::Bvc, AddressingMode::Relative8),
    op(Mnemonic::Eor, AddressingMode::DirectIndirectY),
    op(Mnemonic::Eor, AddressingMode::DirectIndirect),
    op(Mnemonic::Eor, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Mvn, AddressingMode::BlockMove),
    op(Mnemonic::Eor, AddressingMode::DirectX),
    op(Mnemonic::Lsr, AddressingMode::DirectX),
    op(Mnemonic::Eor, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Cli, AddressingMode::Implied),
    op(Mnemonic::Eor, AddressingMode::AbsoluteY),
    op(Mnemonic::Phy, AddressingMode::Implied),
    op(Mnemonic::Tcd, AddressingMode::Implied),
    op(Mnemonic::Jml, AddressingMode::AbsoluteLong),
    op(Mnemonic::Eor, AddressingMode::AbsoluteX),
    op(Mnemonic::Lsr, AddressingMode::AbsoluteX),
    op(Mnemonic::Eor, AddressingMode::AbsoluteLongX),
    // 0x60
    op(Mnemonic::Rts, AddressingMode::Implied),
    op(Mnemonic::Adc, AddressingMode::DirectXIndirect),
    op(Mnemonic::Per, AddressingMode::Relative16),
    op(Mnemonic::Adc, AddressingMode::StackRelative),
    op(Mnemonic::Stz, AddressingMode::Direct),
    op(Mnemonic::Adc, AddressingMode::Direct),
    op(Mnemonic::Ror, AddressingMode::Direct),
    op(Mnemonic::Adc, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Pla, AddressingMode::Implied),
    op(Mnemonic::Adc, AddressingMode::Immediate),
    op(Mnemonic::Ror, AddressingMode::Accumulator),
    op(Mnemonic::Rtl, AddressingMode::Implied),
    op(Mnemonic::Jmp, AddressingMode::AbsoluteIndirect),
    op(Mnemonic::Adc, AddressingMode::Absolute),
    op(Mnemonic::Ror, AddressingMode::Absolute),
    op(Mnemonic::Adc, AddressingMode::AbsoluteLong),
    // 0x70
    op(Mnemonic::Bvs, AddressingMode::Relative8),
    op(Mnemonic::Adc, AddressingMode::DirectIndirectY),
    op(Mnemonic::Adc, AddressingMode::DirectIndirect),
    op(Mnemonic::Adc, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Stz, AddressingMode::DirectX),
    op(Mnemonic::Adc, AddressingMode::DirectX),
    op(Mnemonic::Ror, AddressingMode::DirectX),
    op(Mnemonic::Adc, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Sei, AddressingMode::Implied),
    op(Mnemonic::Adc, AddressingMode::AbsoluteY),
    op(Mnemonic::Ply, AddressingMode::Implied),
    op(Mnemonic::Tdc, AddressingMode::Implied),
    op(Mnemonic::Jmp, AddressingMode::AbsoluteXIndirect),
    op(Mnemonic::Adc, AddressingMode::AbsoluteX),
    op(Mnemonic::Ror, AddressingMode::AbsoluteX),
    op(Mnemonic::Adc, AddressingMode::AbsoluteLongX),
    // 0x80
    op(Mnemonic::Bra, AddressingMode::Relative8),
    op(Mnemonic::Sta, AddressingMode::DirectXIndirect),
    op(Mnemonic::Brl, AddressingMode::Relative16),
    op(Mnemonic::Sta, AddressingMode::StackRelative),
    op(Mnemonic::Sty, AddressingMode::Direct),
    op(Mnemonic::Sta, AddressingMode::Direct),
    op(Mnemonic::Stx, AddressingMode::Direct),
    op(Mnemonic::Sta, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Dey, AddressingMode::Implied),
    op(Mnemonic::Bit, AddressingMode::Immediate),
    op(Mnemonic::Txa, AddressingMode::Implied),
    op(Mnemonic::Phb, AddressingMode::Implied),
    op(Mnemonic::Sty, AddressingMode::Absolute),
    op(Mnemonic::Sta, AddressingMode::Absolute),
    op(Mnemonic::Stx, AddressingMode::Absolute),
    op(Mnemonic::Sta, AddressingMode::AbsoluteLong),
    // 0x90
    op(Mnemonic::Bcc, AddressingMode::Relative8),
    op(Mnemonic::Sta, AddressingMode::DirectIndirectY),
    op(Mnemonic::Sta, AddressingMode::DirectIndirect),
    op(Mnemonic::Sta, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Sty, AddressingMode::DirectX),
    op(Mnemonic::Sta, AddressingMode::DirectX),
    op(Mnemonic::Stx, AddressingMode::DirectY),
    op(Mnemonic::Sta, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Tya, AddressingMode::Implied),
    op(Mnemonic::Sta, AddressingMode::AbsoluteY),
    op(Mnemonic::Txs, AddressingMode::Implied),
    op(Mnemonic::Txy, AddressingMode::Implied),
    op(Mnemonic::Stz, AddressingMode::Absolute),
    op(Mnemonic::Sta, AddressingMode::AbsoluteX),
    op(Mnemonic::Stz, AddressingMode::AbsoluteX),
    op(Mnemonic::Sta, AddressingMode::AbsoluteLongX),
    // 0xA0
    op(Mnemonic::Ldy, AddressingMode::ImmediateIndex),
    op(Mnemonic::Lda, AddressingMode::DirectXIndirect),
    op(Mnemonic::Ldx, AddressingMode::ImmediateIndex),
    op(Mnemonic::Lda, AddressingMode::StackRelative),
    op(Mnemonic::Ldy, AddressingMode::Direct),
    op(Mnemonic::Lda, AddressingMode::Direct),
    op(Mnemonic::Ldx, AddressingMode::Direct),
    op(Mnemonic::Lda, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Tay, AddressingMode::Implied),
    op(Mnemonic::Lda, AddressingMode::Immediate),
    op(Mnemonic::Tax, AddressingMode::Implied),
    op(Mnemonic::Plb, AddressingMode::Implied),
    op(Mnemonic::Ldy, AddressingMode::Absolute),
    op(Mnemonic::Lda, AddressingMode::Absolute),
    op(Mnemonic::Ldx, AddressingMode::Absolute),
    op(Mnemonic::Lda, AddressingMode::AbsoluteLong),
    // 0xB0
    op(Mnemonic::Bcs, AddressingMode::Relative8),
    op(Mnemonic::Lda, AddressingMode::DirectIndirectY),
    op(Mnemonic::Lda, AddressingMode::DirectIndirect),
    op(Mnemonic::Lda, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Ldy, AddressingMode::DirectX),
    op(Mnemonic::Lda, AddressingMode::DirectX),
    op(Mnemonic::Ldx, AddressingMode::DirectY),
    op(Mnemonic::Lda, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Clv, AddressingMode::Implied),
    op(Mnemonic::Lda, AddressingMode::AbsoluteY),
    op(Mnemonic::Tsx, AddressingMode::Implied),
    op(Mnemonic::Tyx, AddressingMode::Implied),
    op(Mnemonic::Ldy, AddressingMode::AbsoluteX),
    op(Mnemonic::Lda, AddressingMode::AbsoluteX),
    op(Mnemonic::Ldx, AddressingMode::AbsoluteY),
    op(Mnemonic::Lda, AddressingMode::AbsoluteLongX),
    // 0xC0
    op(Mnemonic::Cpy, AddressingMode::ImmediateIndex),
    op(Mnemonic::Cmp, AddressingMode::DirectXIndirect),
    op(Mnemonic::Rep, AddressingMode::Immediate8),
    op(Mnemonic::Cmp, AddressingMode::StackRelative),
    op(Mnemonic::Cpy, AddressingMode::Direct),
    op(Mnemonic::Cmp, AddressingMode::Direct),
    op(Mnemonic::Dec, AddressingMode::Direct),
    op(Mnemonic::Cmp, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Iny, AddressingMode::Implied),
    op(Mnemonic::Cmp, AddressingMode::Immediate),
    op(Mnemonic::Dex, AddressingMode::Implied),
    op(Mnemonic::Wai, AddressingMode::Implied),
    op(Mnemonic::Cpy, AddressingMode::Absolute),
    op(Mnemonic::Cmp, AddressingMode::Absolute),
    op(Mnemonic::Dec, AddressingMode::Absolute),
    op(Mnemonic::Cmp, AddressingMode::AbsoluteLong),
    // 0xD0
    op(Mnemonic::Bne, AddressingMode::Relative8),
    op(Mnemonic::Cmp, AddressingMode::DirectIndirectY),
    op(Mnemonic::Cmp, AddressingMode::DirectIndirect),
    op(Mnemonic::Cmp, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Pei, AddressingMode::DirectIndirect),
    op(Mnemonic::Cmp, AddressingMode::DirectX),
    op(Mnemonic::Dec, AddressingMode::DirectX),
    op(Mnemonic::Cmp, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Cld, AddressingMode::Implied),
    op(Mnemonic::Cmp, AddressingMode::AbsoluteY),
    op(Mnemonic::Phx, AddressingMode::Implied),
    op(Mnemonic::Stp, AddressingMode::Implied),
    op(Mnemonic::Jml, AddressingMode::AbsoluteIndirectLong),
    op(Mnemonic::Cmp, AddressingMode::AbsoluteX),
    op(Mnemonic::Dec, AddressingMode::AbsoluteX),
    op(Mnemonic::Cmp, AddressingMode::AbsoluteLongX),
    // 0xE0
    op(Mnemonic::Cpx, AddressingMode::ImmediateIndex),
    op(Mnemonic::Sbc, AddressingMode::DirectXIndirect),
    op(Mnemonic::Sep, AddressingMode::Immediate8),
    op(Mnemonic::Sbc, AddressingMode::StackRelative),
    op(Mnemonic::Cpx, AddressingMode::Direct),
    op(Mnemonic::Sbc, AddressingMode::Direct),
    op(Mnemonic::Inc, AddressingMode::Direct),
    op(Mnemonic::Sbc, AddressingMode::DirectIndirectLong),
    op(Mnemonic::Inx, AddressingMode::Implied),
    op(Mnemonic::Sbc, AddressingMode::Immediate),
    op(Mnemonic::Nop, AddressingMode::Implied),
    op(Mnemonic::Xba, AddressingMode::Implied),
    op(Mnemonic::Cpx, AddressingMode::Absolute),
    op(Mnemonic::Sbc, AddressingMode::Absolute),
    op(Mnemonic::Inc, AddressingMode::Absolute),
    op(Mnemonic::Sbc, AddressingMode::AbsoluteLong),
    // 0xF0
    op(Mnemonic::Beq, AddressingMode::Relative8),
    op(Mnemonic::Sbc, AddressingMode::DirectIndirectY),
    op(Mnemonic::Sbc, AddressingMode::DirectIndirect),
    op(Mnemonic::Sbc, AddressingMode::StackRelativeIndirectY),
    op(Mnemonic::Pea, AddressingMode::Absolute),
    op(Mnemonic::Sbc, AddressingMode::DirectX),
    op(Mnemonic::Inc, AddressingMode::DirectX),
    op(Mnemonic::Sbc, AddressingMode::DirectIndirectLongY),
    op(Mnemonic::Sed, AddressingMode::Implied),
    op(Mnemonic::Sbc, AddressingMode::AbsoluteY),
    op(Mnemonic::Plx, AddressingMode::Implied),
    op(Mnemonic::Xce, AddressingMode::Implied),
    op(Mnemonic::Jsr, AddressingMode::AbsoluteXIndirect),
    op(Mnemonic::Sbc, AddressingMode::AbsoluteX),
    op(Mnemonic::Inc, AddressingMode::AbsoluteX),
    op(Mnemonic::Sbc, AddressingMode::AbsoluteLongX),
];

/// Looks up the table entry for an opcode byte.
#[must_use]
pub const fn decode_opcode(opcode: u8) -> Opcode {
    OPCODE_TABLE[opcode as usize]
}
