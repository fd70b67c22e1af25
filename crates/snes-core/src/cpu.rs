//! 65C816 processor core: register file, interrupt lines, stack and the
//! cycle-charging bus primitives the instruction implementations build on.
//!
//! The processor never owns the bus. Every call that touches memory takes
//! `&mut dyn CpuBus`, and every access made through the primitives below
//! costs exactly one cycle. Internal operations charge one idle cycle each,
//! so the total returned by [`Cpu::step`] is the sum of the two.

use crate::api::{CpuBus, InterruptKind, StepOutcome};
use crate::memory::ADDRESS_MASK;
use crate::state::{
    RegisterClass, Registers, RunState, Width, FLAG_B, FLAG_D, FLAG_I, FLAG_N, FLAG_Z,
};
use crate::timing::INTERRUPT_ENTRY_CYCLES;

/// Reset vector address in bank 0.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// Native-mode NMI vector.
pub const NMI_VECTOR_NATIVE: u16 = 0xFFEA;
/// Emulation-mode NMI vector.
pub const NMI_VECTOR_EMULATION: u16 = 0xFFFA;
/// Native-mode IRQ vector.
pub const IRQ_VECTOR_NATIVE: u16 = 0xFFEE;
/// Emulation-mode IRQ vector (shared with `BRK`).
pub const IRQ_VECTOR_EMULATION: u16 = 0xFFFE;
/// Native-mode `BRK` vector.
pub const BRK_VECTOR_NATIVE: u16 = 0xFFE6;
/// Native-mode `COP` vector.
pub const COP_VECTOR_NATIVE: u16 = 0xFFE4;
/// Emulation-mode `COP` vector.
pub const COP_VECTOR_EMULATION: u16 = 0xFFF4;
/// Entry point used when the reset vector reads as blank (`0x0000`/`0xFFFF`).
pub const DEFAULT_RESET_FALLBACK_PC: u16 = 0x8000;

/// Location of a memory operand.
///
/// Direct-page and stack-relative operands live in bank 0 and their second
/// byte wraps at 16 bits; everything else carries across banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Bank0(u16),
    Long(u32),
}

impl Target {
    pub(crate) const fn address(self) -> u32 {
        match self {
            Self::Bank0(addr) => addr as u32,
            Self::Long(addr) => addr & ADDRESS_MASK,
        }
    }

    pub(crate) const fn next(self) -> Self {
        match self {
            Self::Bank0(addr) => Self::Bank0(addr.wrapping_add(1)),
            Self::Long(addr) => Self::Long(addr.wrapping_add(1) & ADDRESS_MASK),
        }
    }
}

/// Software interrupt sources handled by [`Cpu::software_interrupt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SoftwareInterrupt {
    Brk,
    Cop,
}

/// 65C816 processor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    pub(crate) regs: Registers,
    pub(crate) run_state: RunState,
    nmi_pending: bool,
    irq_pending: bool,
    cycles: u64,
    pub(crate) step_cycles: u32,
    reset_fallback_pc: u16,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Creates a processor in its power-on register state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_reset_fallback(DEFAULT_RESET_FALLBACK_PC)
    }

    /// Creates a processor that enters at `fallback_pc` when the reset
    /// vector is blank.
    #[must_use]
    pub fn with_reset_fallback(fallback_pc: u16) -> Self {
        Self {
            regs: Registers::default(),
            run_state: RunState::Running,
            nmi_pending: false,
            irq_pending: false,
            cycles: 0,
            step_cycles: 0,
            reset_fallback_pc: fallback_pc,
        }
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Mutable register file, for hosts and tests that seed state directly.
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Cycles consumed since the last reset.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Latches a non-maskable interrupt request.
    pub const fn raise_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Sets or clears the latched NMI request.
    pub const fn set_nmi_pending(&mut self, pending: bool) {
        self.nmi_pending = pending;
    }

    /// Drives the level-sensitive IRQ line.
    ///
    /// The line stays asserted after the interrupt is taken; the handler is
    /// expected to acknowledge the source, which then lowers it.
    pub const fn set_irq_line(&mut self, asserted: bool) {
        self.irq_pending = asserted;
    }

    /// Returns `true` while an NMI is latched.
    #[must_use]
    pub const fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Returns `true` while the IRQ line is asserted.
    #[must_use]
    pub const fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Returns `true` when every bit of `mask` is set in `P`.
    #[must_use]
    pub const fn flag(&self, mask: u8) -> bool {
        self.regs.flag(mask)
    }

    /// Sets or clears the bits of `mask` in `P`.
    pub const fn set_flag(&mut self, mask: u8, enabled: bool) {
        self.regs.set_flag(mask, enabled);
    }

    /// Sets `Z` from `value` at the width of `class`.
    pub const fn update_zero_flag(&mut self, value: u16, class: RegisterClass) {
        let width = self.regs.width_of(class);
        self.regs.set_flag(FLAG_Z, value & width.mask() == 0);
    }

    /// Sets `N` from `value` at the width of `class`.
    pub const fn update_negative_flag(&mut self, value: u16, class: RegisterClass) {
        let width = self.regs.width_of(class);
        self.regs.set_flag(FLAG_N, value & width.sign_bit() != 0);
    }

    /// Returns the processor to its reset state and loads `PC` from the
    /// reset vector. The vector fetch is not charged.
    pub fn reset(&mut self, bus: &mut dyn CpuBus) {
        self.regs = Registers::default();
        self.run_state = RunState::Running;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.cycles = 0;
        self.step_cycles = 0;

        let vector = u16::from_le_bytes([
            bus.read(u32::from(RESET_VECTOR)),
            bus.read(u32::from(RESET_VECTOR) + 1),
        ]);
        let entry = if vector == 0x0000 || vector == 0xFFFF {
            log::warn!(
                "reset vector reads {vector:#06x}; entering at fallback {:#06x}",
                self.reset_fallback_pc
            );
            self.reset_fallback_pc
        } else {
            vector
        };
        self.regs.set_pc(entry);
    }

    /// Executes one instruction or interrupt entry and returns its cycles.
    pub fn step(&mut self, bus: &mut dyn CpuBus) -> u32 {
        self.step_detailed(bus).cycles()
    }

    /// Executes one instruction or interrupt entry and reports what ran.
    pub fn step_detailed(&mut self, bus: &mut dyn CpuBus) -> StepOutcome {
        self.step_cycles = 0;
        let outcome = self.step_inner(bus);
        self.cycles += u64::from(outcome.cycles());
        outcome
    }

    fn step_inner(&mut self, bus: &mut dyn CpuBus) -> StepOutcome {
        match self.run_state {
            RunState::Stopped => {
                self.idle();
                return StepOutcome::Stopped {
                    cycles: self.step_cycles,
                };
            }
            RunState::Waiting => {
                if !(self.nmi_pending || self.irq_pending) {
                    self.idle();
                    return StepOutcome::Waiting {
                        cycles: self.step_cycles,
                    };
                }
                self.run_state = RunState::Running;
            }
            RunState::Running => {}
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            return self.hardware_interrupt(bus, InterruptKind::Nmi);
        }
        if self.irq_pending && !self.regs.flag(FLAG_I) {
            return self.hardware_interrupt(bus, InterruptKind::Irq);
        }

        let pbr = self.regs.pbr();
        let pc = self.regs.pc();
        let opcode = self.fetch8(bus);
        self.execute(bus, opcode);
        StepOutcome::Executed {
            pbr,
            pc,
            opcode,
            cycles: self.step_cycles,
        }
    }

    fn hardware_interrupt(&mut self, bus: &mut dyn CpuBus, kind: InterruptKind) -> StepOutcome {
        let emulation = self.regs.emulation();
        self.idle();
        if emulation {
            self.idle();
        } else {
            self.push8(bus, self.regs.pbr());
        }
        self.push16(bus, self.regs.pc());
        let status = if emulation {
            self.regs.p() & !FLAG_B
        } else {
            self.regs.p()
        };
        self.push8(bus, status);

        let vector = kind.vector(emulation);
        self.enter_vector(bus, vector);
        debug_assert_eq!(self.step_cycles, INTERRUPT_ENTRY_CYCLES);
        StepOutcome::Interrupt {
            kind,
            vector,
            cycles: self.step_cycles,
        }
    }

    pub(crate) fn software_interrupt(&mut self, bus: &mut dyn CpuBus, source: SoftwareInterrupt) {
        self.fetch8(bus);
        let emulation = self.regs.emulation();
        if !emulation {
            self.push8(bus, self.regs.pbr());
        }
        self.push16(bus, self.regs.pc());
        let status = match source {
            SoftwareInterrupt::Brk if emulation => self.regs.p() | FLAG_B,
            SoftwareInterrupt::Brk | SoftwareInterrupt::Cop => self.regs.p(),
        };
        self.push8(bus, status);

        let vector = match (source, emulation) {
            (SoftwareInterrupt::Brk, true) => IRQ_VECTOR_EMULATION,
            (SoftwareInterrupt::Brk, false) => BRK_VECTOR_NATIVE,
            (SoftwareInterrupt::Cop, true) => COP_VECTOR_EMULATION,
            (SoftwareInterrupt::Cop, false) => COP_VECTOR_NATIVE,
        };
        self.enter_vector(bus, vector);
    }

    fn enter_vector(&mut self, bus: &mut dyn CpuBus, vector: u16) {
        self.regs.set_flag(FLAG_I, true);
        self.regs.set_flag(FLAG_D, false);
        self.regs.set_pbr(0);
        let entry = self.read_word(bus, Target::Bank0(vector));
        self.regs.set_pc(entry);
    }

    pub(crate) const fn idle(&mut self) {
        self.step_cycles += 1;
    }

    pub(crate) fn read8(&mut self, bus: &mut dyn CpuBus, addr: u32) -> u8 {
        self.step_cycles += 1;
        bus.read(addr & ADDRESS_MASK)
    }

    pub(crate) fn write8(&mut self, bus: &mut dyn CpuBus, addr: u32, value: u8) {
        self.step_cycles += 1;
        bus.write(addr & ADDRESS_MASK, value);
    }

    pub(crate) fn fetch8(&mut self, bus: &mut dyn CpuBus) -> u8 {
        let addr = self.regs.program_address();
        self.regs.set_pc(self.regs.pc().wrapping_add(1));
        self.read8(bus, addr)
    }

    pub(crate) fn fetch16(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let low = self.fetch8(bus);
        let high = self.fetch8(bus);
        u16::from_le_bytes([low, high])
    }

    pub(crate) fn fetch24(&mut self, bus: &mut dyn CpuBus) -> u32 {
        let addr = self.fetch16(bus);
        let bank = self.fetch8(bus);
        (u32::from(bank) << 16) | u32::from(addr)
    }

    pub(crate) fn fetch_width(&mut self, bus: &mut dyn CpuBus, width: Width) -> u16 {
        match width {
            Width::Byte => u16::from(self.fetch8(bus)),
            Width::Word => self.fetch16(bus),
        }
    }

    pub(crate) fn read_word(&mut self, bus: &mut dyn CpuBus, target: Target) -> u16 {
        let low = self.read8(bus, target.address());
        let high = self.read8(bus, target.next().address());
        u16::from_le_bytes([low, high])
    }

    pub(crate) fn read_long(&mut self, bus: &mut dyn CpuBus, target: Target) -> u32 {
        let addr = self.read_word(bus, target);
        let bank = self.read8(bus, target.next().next().address());
        (u32::from(bank) << 16) | u32::from(addr)
    }

    pub(crate) fn read_target(&mut self, bus: &mut dyn CpuBus, target: Target, width: Width) -> u16 {
        match width {
            Width::Byte => u16::from(self.read8(bus, target.address())),
            Width::Word => self.read_word(bus, target),
        }
    }

    pub(crate) fn write_target(
        &mut self,
        bus: &mut dyn CpuBus,
        target: Target,
        width: Width,
        value: u16,
    ) {
        let [low, high] = value.to_le_bytes();
        self.write8(bus, target.address(), low);
        if width == Width::Word {
            self.write8(bus, target.next().address(), high);
        }
    }

    pub(crate) fn push8(&mut self, bus: &mut dyn CpuBus, value: u8) {
        let s = self.regs.s();
        self.write8(bus, u32::from(s), value);
        self.regs.set_s(s.wrapping_sub(1));
    }

    pub(crate) fn pull8(&mut self, bus: &mut dyn CpuBus) -> u8 {
        let s = self.regs.s().wrapping_add(1);
        self.regs.set_s(s);
        self.read8(bus, u32::from(self.regs.s()))
    }

    pub(crate) fn push16(&mut self, bus: &mut dyn CpuBus, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.push8(bus, high);
        self.push8(bus, low);
    }

    pub(crate) fn pull16(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let low = self.pull8(bus);
        let high = self.pull8(bus);
        u16::from_le_bytes([low, high])
    }

    pub(crate) fn push_width(&mut self, bus: &mut dyn CpuBus, width: Width, value: u16) {
        match width {
            Width::Byte => self.push8(bus, value.to_le_bytes()[0]),
            Width::Word => self.push16(bus, value),
        }
    }

    pub(crate) fn pull_width(&mut self, bus: &mut dyn CpuBus, width: Width) -> u16 {
        match width {
            Width::Byte => u16::from(self.pull8(bus)),
            Width::Word => self.pull16(bus),
        }
    }

    pub(crate) const fn set_nz(&mut self, value: u16, width: Width) {
        self.regs.set_flag(FLAG_Z, value & width.mask() == 0);
        self.regs.set_flag(FLAG_N, value & width.sign_bit() != 0);
    }
}
