//! Effective-address resolution for the data addressing modes.

use crate::api::CpuBus;
use crate::cpu::{Cpu, Target};
use crate::encoding::AddressingMode;
use crate::memory::ADDRESS_MASK;
use crate::state::Width;

/// How the resolved operand will be used. Indexed modes charge their
/// page-cross cycle unconditionally for anything but a plain read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
    Modify,
}

impl Cpu {
    /// Consumes the operand bytes of `mode` and returns where the data lives.
    ///
    /// Modes without a data operand never reach this path; they resolve to
    /// the current program address.
    pub(crate) fn resolve(
        &mut self,
        bus: &mut dyn CpuBus,
        mode: AddressingMode,
        access: Access,
    ) -> Target {
        match mode {
            AddressingMode::Direct => {
                let base = self.direct_operand(bus);
                Target::Bank0(base)
            }
            AddressingMode::DirectX => {
                let base = self.direct_operand(bus);
                self.idle();
                Target::Bank0(base.wrapping_add(self.regs.x()))
            }
            AddressingMode::DirectY => {
                let base = self.direct_operand(bus);
                self.idle();
                Target::Bank0(base.wrapping_add(self.regs.y()))
            }
            AddressingMode::DirectIndirect => {
                let pointer = self.direct_operand(bus);
                let addr = self.read_word(bus, Target::Bank0(pointer));
                Target::Long(self.data_address(addr))
            }
            AddressingMode::DirectIndirectLong => {
                let pointer = self.direct_operand(bus);
                Target::Long(self.read_long(bus, Target::Bank0(pointer)))
            }
            AddressingMode::DirectXIndirect => {
                let base = self.direct_operand(bus);
                self.idle();
                let pointer = base.wrapping_add(self.regs.x());
                let addr = self.read_word(bus, Target::Bank0(pointer));
                Target::Long(self.data_address(addr))
            }
            AddressingMode::DirectIndirectY => {
                let pointer = self.direct_operand(bus);
                let addr = self.read_word(bus, Target::Bank0(pointer));
                let base = self.data_address(addr);
                self.indexed(base, self.regs.y(), access)
            }
            AddressingMode::DirectIndirectLongY => {
                let pointer = self.direct_operand(bus);
                let base = self.read_long(bus, Target::Bank0(pointer));
                Target::Long(base.wrapping_add(u32::from(self.regs.y())) & ADDRESS_MASK)
            }
            AddressingMode::Absolute => {
                let addr = self.fetch16(bus);
                Target::Long(self.data_address(addr))
            }
            AddressingMode::AbsoluteX => {
                let addr = self.fetch16(bus);
                let base = self.data_address(addr);
                self.indexed(base, self.regs.x(), access)
            }
            AddressingMode::AbsoluteY => {
                let addr = self.fetch16(bus);
                let base = self.data_address(addr);
                self.indexed(base, self.regs.y(), access)
            }
            AddressingMode::AbsoluteLong => Target::Long(self.fetch24(bus)),
            AddressingMode::AbsoluteLongX => {
                let base = self.fetch24(bus);
                Target::Long(base.wrapping_add(u32::from(self.regs.x())) & ADDRESS_MASK)
            }
            AddressingMode::StackRelative => {
                let offset = self.fetch8(bus);
                self.idle();
                Target::Bank0(self.regs.s().wrapping_add(u16::from(offset)))
            }
            AddressingMode::StackRelativeIndirectY => {
                let offset = self.fetch8(bus);
                self.idle();
                let pointer = self.regs.s().wrapping_add(u16::from(offset));
                let addr = self.read_word(bus, Target::Bank0(pointer));
                self.idle();
                let base = self.data_address(addr);
                Target::Long(base.wrapping_add(u32::from(self.regs.y())) & ADDRESS_MASK)
            }
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Immediate
            | AddressingMode::ImmediateIndex
            | AddressingMode::Immediate8
            | AddressingMode::Relative8
            | AddressingMode::Relative16
            | AddressingMode::AbsoluteIndirect
            | AddressingMode::AbsoluteIndirectLong
            | AddressingMode::AbsoluteXIndirect
            | AddressingMode::BlockMove => Target::Long(self.regs.program_address()),
        }
    }

    /// Reads the operand of a read-type instruction at `width`, fetching it
    /// from the instruction stream for immediate modes.
    pub(crate) fn read_operand(
        &mut self,
        bus: &mut dyn CpuBus,
        mode: AddressingMode,
        width: Width,
    ) -> u16 {
        match mode {
            AddressingMode::Immediate | AddressingMode::ImmediateIndex => {
                self.fetch_width(bus, width)
            }
            _ => {
                let target = self.resolve(bus, mode, Access::Read);
                self.read_target(bus, target, width)
            }
        }
    }

    /// Fetches a direct-page offset and returns `D + offset` (bank 0).
    /// A non-zero `D` low byte costs one extra cycle.
    pub(crate) fn direct_operand(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let offset = self.fetch8(bus);
        let d = self.regs.d();
        if d & 0x00FF != 0 {
            self.idle();
        }
        d.wrapping_add(u16::from(offset))
    }

    const fn data_address(&self, addr: u16) -> u32 {
        ((self.regs.dbr() as u32) << 16) | addr as u32
    }

    fn indexed(&mut self, base: u32, index: u16, access: Access) -> Target {
        let addr = base.wrapping_add(u32::from(index)) & ADDRESS_MASK;
        let crosses_page = (base ^ addr) & 0xFF_FF00 != 0;
        if access != Access::Read || self.regs.index_width() == Width::Word || crosses_page {
            self.idle();
        }
        Target::Long(addr)
    }
}
