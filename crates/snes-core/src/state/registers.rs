/// Status bit: carry.
pub const FLAG_C: u8 = 0x01;
/// Status bit: zero result.
pub const FLAG_Z: u8 = 0x02;
/// Status bit: IRQ disable.
pub const FLAG_I: u8 = 0x04;
/// Status bit: decimal arithmetic.
pub const FLAG_D: u8 = 0x08;
/// Status bit: 8-bit index registers (break flag when pushed in emulation mode).
pub const FLAG_X: u8 = 0x10;
/// Status bit: 8-bit accumulator and memory.
pub const FLAG_M: u8 = 0x20;
/// Status bit: signed overflow.
pub const FLAG_V: u8 = 0x40;
/// Status bit: negative result.
pub const FLAG_N: u8 = 0x80;
/// Break bit as seen on the stack in emulation mode (shares the `X` position).
pub const FLAG_B: u8 = FLAG_X;

/// Status register value after reset (`M`, `X` and `I` set).
pub const RESET_STATUS: u8 = FLAG_M | FLAG_X | FLAG_I;
/// Stack pointer value after reset.
pub const RESET_STACK: u16 = 0x01FF;
/// Page the stack is pinned to in emulation mode.
pub const EMULATION_STACK_PAGE: u16 = 0x0100;

/// Operand width selected by the `M` or `X` status bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8-bit operation.
    Byte,
    /// 16-bit operation.
    Word,
}

impl Width {
    /// Width selected by a status bit that means "8-bit" when set.
    #[must_use]
    pub const fn from_narrow_flag(narrow: bool) -> Self {
        if narrow {
            Self::Byte
        } else {
            Self::Word
        }
    }

    /// Mask covering every bit of the width.
    #[must_use]
    pub const fn mask(self) -> u16 {
        match self {
            Self::Byte => 0x00FF,
            Self::Word => 0xFFFF,
        }
    }

    /// Most significant bit of the width.
    #[must_use]
    pub const fn sign_bit(self) -> u16 {
        match self {
            Self::Byte => 0x0080,
            Self::Word => 0x8000,
        }
    }

    /// Operand size in bytes.
    #[must_use]
    pub const fn bytes(self) -> u16 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
        }
    }
}

/// Register group whose width flag governs a flag update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterClass {
    /// Accumulator and memory operands (`M` flag).
    Accumulator,
    /// `X`/`Y` index registers (`X` flag).
    Index,
}

/// 65C816 programmer-visible register file.
///
/// Setters keep the mode invariants: entering emulation mode sets `M`/`X`,
/// the stack stays in page 1 while emulation lasts, and with `X` set the
/// index high bytes read 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers {
    a: u16,
    x: u16,
    y: u16,
    s: u16,
    d: u16,
    pc: u16,
    pbr: u8,
    dbr: u8,
    p: u8,
    emulation: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: RESET_STACK,
            d: 0,
            pc: 0,
            pbr: 0,
            dbr: 0,
            p: RESET_STATUS,
            emulation: true,
        }
    }
}

impl Registers {
    /// Full 16-bit accumulator (`B:A`).
    #[must_use]
    pub const fn a(&self) -> u16 {
        self.a
    }

    /// Writes all 16 accumulator bits regardless of `M`.
    pub const fn set_a(&mut self, value: u16) {
        self.a = value;
    }

    /// `X` index register.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Writes `X`; only the low byte is kept while `X` is set.
    pub const fn set_x(&mut self, value: u16) {
        self.x = value & self.index_width().mask();
    }

    /// `Y` index register.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// Writes `Y`; only the low byte is kept while `X` is set.
    pub const fn set_y(&mut self, value: u16) {
        self.y = value & self.index_width().mask();
    }

    /// Stack pointer.
    #[must_use]
    pub const fn s(&self) -> u16 {
        self.s
    }

    /// Writes the stack pointer, pinned to page 1 in emulation mode.
    pub const fn set_s(&mut self, value: u16) {
        self.s = if self.emulation {
            EMULATION_STACK_PAGE | (value & 0x00FF)
        } else {
            value
        };
    }

    /// Direct page base.
    #[must_use]
    pub const fn d(&self) -> u16 {
        self.d
    }

    /// Writes the direct page base.
    pub const fn set_d(&mut self, value: u16) {
        self.d = value;
    }

    /// Program counter within the program bank.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Program bank register.
    #[must_use]
    pub const fn pbr(&self) -> u8 {
        self.pbr
    }

    /// Writes the program bank register.
    pub const fn set_pbr(&mut self, value: u8) {
        self.pbr = value;
    }

    /// Data bank register.
    #[must_use]
    pub const fn dbr(&self) -> u8 {
        self.dbr
    }

    /// Writes the data bank register.
    pub const fn set_dbr(&mut self, value: u8) {
        self.dbr = value;
    }

    /// Status register.
    #[must_use]
    pub const fn p(&self) -> u8 {
        self.p
    }

    /// Writes the status register. Setting `X` clears the index high bytes.
    pub const fn set_p(&mut self, value: u8) {
        self.p = value;
        if self.p & FLAG_X != 0 {
            self.x &= 0x00FF;
            self.y &= 0x00FF;
        }
    }

    /// Writes a status byte pulled by `PLP` or `RTI`.
    ///
    /// In emulation mode bits 4 and 5 of a stacked status are the break
    /// and unused bits, so the live `M` and `X` are kept.
    pub const fn restore_p(&mut self, value: u8) {
        let value = if self.emulation {
            (value & !(FLAG_M | FLAG_X)) | (self.p & (FLAG_M | FLAG_X))
        } else {
            value
        };
        self.set_p(value);
    }

    /// Returns `true` when every bit of `mask` is set in `P`.
    #[must_use]
    pub const fn flag(&self, mask: u8) -> bool {
        self.p & mask == mask
    }

    /// Sets or clears the bits of `mask` in `P`.
    pub const fn set_flag(&mut self, mask: u8, enabled: bool) {
        let value = if enabled {
            self.p | mask
        } else {
            self.p & !mask
        };
        self.set_p(value);
    }

    /// Emulation (6502-compatible) mode flag.
    #[must_use]
    pub const fn emulation(&self) -> bool {
        self.emulation
    }

    /// Enters or leaves emulation mode.
    ///
    /// The switch into emulation forces 8-bit registers and pins the stack
    /// to page 1. Staying in emulation or leaving it changes no other
    /// register.
    pub const fn set_emulation(&mut self, enabled: bool) {
        let entering = enabled && !self.emulation;
        self.emulation = enabled;
        if entering {
            self.set_p(self.p | FLAG_M | FLAG_X);
        }
        if enabled {
            self.set_s(self.s);
        }
    }

    /// Accumulator/memory width selected by `M`.
    #[must_use]
    pub const fn accumulator_width(&self) -> Width {
        Width::from_narrow_flag(self.p & FLAG_M != 0)
    }

    /// Index register width selected by `X`.
    #[must_use]
    pub const fn index_width(&self) -> Width {
        Width::from_narrow_flag(self.p & FLAG_X != 0)
    }

    /// Width governing `class`.
    #[must_use]
    pub const fn width_of(&self, class: RegisterClass) -> Width {
        match class {
            RegisterClass::Accumulator => self.accumulator_width(),
            RegisterClass::Index => self.index_width(),
        }
    }

    /// Accumulator value at the current `M` width.
    #[must_use]
    pub const fn accumulator(&self) -> u16 {
        self.a & self.accumulator_width().mask()
    }

    /// Writes the accumulator at the current `M` width, preserving the high
    /// byte in 8-bit mode.
    pub const fn set_accumulator(&mut self, value: u16) {
        self.a = match self.accumulator_width() {
            Width::Byte => (self.a & 0xFF00) | (value & 0x00FF),
            Width::Word => value,
        };
    }

    /// 24-bit address of the next instruction byte (`PBR:PC`).
    #[must_use]
    pub const fn program_address(&self) -> u32 {
        ((self.pbr as u32) << 16) | self.pc as u32
    }
}
