//! Instruction semantics for all 256 opcodes.
//!
//! Each opcode byte decodes through [`crate::encoding::OPCODE_TABLE`] to a
//! mnemonic and an addressing mode; the mnemonic selects the behavior and
//! the mode selects how the operand is reached. Operand widths are read from
//! `M`/`X` at the moment each instruction runs.

#![allow(
    clippy::too_many_lines,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

mod flags;
mod helpers;

use flags::{add, compare, subtract, ArithResult};

use crate::api::CpuBus;
use crate::cpu::{Cpu, SoftwareInterrupt, Target};
use crate::encoding::{decode_opcode, AddressingMode, Mnemonic};
use crate::state::{RunState, Width, FLAG_C, FLAG_D, FLAG_I, FLAG_N, FLAG_V, FLAG_Z};
use crate::timing::BLOCK_MOVE_CYCLES_PER_BYTE;
use helpers::Access;

/// Read-modify-write operation applied to a value at a given width.
type ModifyOp = fn(&mut Cpu, u16, Width) -> u16;

impl Cpu {
    pub(crate) fn execute(&mut self, bus: &mut dyn CpuBus, opcode: u8) {
        let entry = decode_opcode(opcode);
        let mode = entry.mode;
        let acc_width = self.regs.accumulator_width();
        let index_width = self.regs.index_width();

        match entry.mnemonic {
            // Loads and stores.
            Mnemonic::Lda => {
                let value = self.read_operand(bus, mode, acc_width);
                self.regs.set_accumulator(value);
                self.set_nz(value, acc_width);
            }
            Mnemonic::Ldx => {
                let value = self.read_operand(bus, mode, index_width);
                self.regs.set_x(value);
                self.set_nz(value, index_width);
            }
            Mnemonic::Ldy => {
                let value = self.read_operand(bus, mode, index_width);
                self.regs.set_y(value);
                self.set_nz(value, index_width);
            }
            Mnemonic::Sta => self.store(bus, mode, acc_width, self.regs.accumulator()),
            Mnemonic::Stx => self.store(bus, mode, index_width, self.regs.x()),
            Mnemonic::Sty => self.store(bus, mode, index_width, self.regs.y()),
            Mnemonic::Stz => self.store(bus, mode, acc_width, 0),

            // Accumulator arithmetic and logic.
            Mnemonic::Ora => {
                let value = self.read_operand(bus, mode, acc_width);
                self.logic_result(self.regs.accumulator() | value);
            }
            Mnemonic::And => {
                let value = self.read_operand(bus, mode, acc_width);
                self.logic_result(self.regs.accumulator() & value);
            }
            Mnemonic::Eor => {
                let value = self.read_operand(bus, mode, acc_width);
                self.logic_result(self.regs.accumulator() ^ value);
            }
            Mnemonic::Adc => {
                let value = self.read_operand(bus, mode, acc_width);
                let sum = add(
                    self.regs.accumulator(),
                    value,
                    self.regs.flag(FLAG_C),
                    acc_width,
                    self.regs.flag(FLAG_D),
                );
                self.arith_result(sum);
            }
            Mnemonic::Sbc => {
                let value = self.read_operand(bus, mode, acc_width);
                let diff = subtract(
                    self.regs.accumulator(),
                    value,
                    self.regs.flag(FLAG_C),
                    acc_width,
                    self.regs.flag(FLAG_D),
                );
                self.arith_result(diff);
            }
            Mnemonic::Cmp => {
                let value = self.read_operand(bus, mode, acc_width);
                self.compare_with(self.regs.accumulator(), value, acc_width);
            }
            Mnemonic::Cpx => {
                let value = self.read_operand(bus, mode, index_width);
                self.compare_with(self.regs.x(), value, index_width);
            }
            Mnemonic::Cpy => {
                let value = self.read_operand(bus, mode, index_width);
                self.compare_with(self.regs.y(), value, index_width);
            }
            Mnemonic::Bit => {
                let value = self.read_operand(bus, mode, acc_width);
                self.regs
                    .set_flag(FLAG_Z, self.regs.accumulator() & value == 0);
                if mode != AddressingMode::Immediate {
                    self.regs.set_flag(FLAG_N, value & acc_width.sign_bit() != 0);
                    self.regs
                        .set_flag(FLAG_V, value & (acc_width.sign_bit() >> 1) != 0);
                }
            }

            // Read-modify-write.
            Mnemonic::Asl => self.modify(bus, mode, Self::shift_left),
            Mnemonic::Lsr => self.modify(bus, mode, Self::shift_right),
            Mnemonic::Rol => self.modify(bus, mode, Self::rotate_left),
            Mnemonic::Ror => self.modify(bus, mode, Self::rotate_right),
            Mnemonic::Inc => self.modify(bus, mode, Self::increment),
            Mnemonic::Dec => self.modify(bus, mode, Self::decrement),
            Mnemonic::Tsb => self.modify(bus, mode, Self::test_and_set),
            Mnemonic::Trb => self.modify(bus, mode, Self::test_and_reset),

            // Index register steps.
            Mnemonic::Inx => {
                self.idle();
                self.regs.set_x(self.regs.x().wrapping_add(1));
                self.set_nz(self.regs.x(), index_width);
            }
            Mnemonic::Iny => {
                self.idle();
                self.regs.set_y(self.regs.y().wrapping_add(1));
                self.set_nz(self.regs.y(), index_width);
            }
            Mnemonic::Dex => {
                self.idle();
                self.regs.set_x(self.regs.x().wrapping_sub(1));
                self.set_nz(self.regs.x(), index_width);
            }
            Mnemonic::Dey => {
                self.idle();
                self.regs.set_y(self.regs.y().wrapping_sub(1));
                self.set_nz(self.regs.y(), index_width);
            }

            // Branches.
            Mnemonic::Bpl => self.branch(bus, !self.regs.flag(FLAG_N)),
            Mnemonic::Bmi => self.branch(bus, self.regs.flag(FLAG_N)),
            Mnemonic::Bvc => self.branch(bus, !self.regs.flag(FLAG_V)),
            Mnemonic::Bvs => self.branch(bus, self.regs.flag(FLAG_V)),
            Mnemonic::Bcc => self.branch(bus, !self.regs.flag(FLAG_C)),
            Mnemonic::Bcs => self.branch(bus, self.regs.flag(FLAG_C)),
            Mnemonic::Bne => self.branch(bus, !self.regs.flag(FLAG_Z)),
            Mnemonic::Beq => self.branch(bus, self.regs.flag(FLAG_Z)),
            Mnemonic::Bra => self.branch(bus, true),
            Mnemonic::Brl => {
                let offset = self.fetch16(bus);
                self.idle();
                self.regs.set_pc(self.regs.pc().wrapping_add(offset));
            }

            // Status register.
            Mnemonic::Clc => self.change_flag(FLAG_C, false),
            Mnemonic::Sec => self.change_flag(FLAG_C, true),
            Mnemonic::Cli => self.change_flag(FLAG_I, false),
            Mnemonic::Sei => self.change_flag(FLAG_I, true),
            Mnemonic::Cld => self.change_flag(FLAG_D, false),
            Mnemonic::Sed => self.change_flag(FLAG_D, true),
            Mnemonic::Clv => self.change_flag(FLAG_V, false),
            Mnemonic::Rep => {
                let mask = self.fetch8(bus);
                self.idle();
                self.regs.set_p(self.regs.p() & !mask);
            }
            Mnemonic::Sep => {
                let mask = self.fetch8(bus);
                self.idle();
                self.regs.set_p(self.regs.p() | mask);
            }
            Mnemonic::Xce => {
                self.idle();
                let carry = self.regs.flag(FLAG_C);
                self.regs.set_flag(FLAG_C, self.regs.emulation());
                self.regs.set_emulation(carry);
            }

            // Register transfers.
            Mnemonic::Tax => {
                self.idle();
                self.regs.set_x(self.regs.a());
                self.set_nz(self.regs.x(), index_width);
            }
            Mnemonic::Tay => {
                self.idle();
                self.regs.set_y(self.regs.a());
                self.set_nz(self.regs.y(), index_width);
            }
            Mnemonic::Txa => {
                self.idle();
                self.regs.set_accumulator(self.regs.x());
                self.set_nz(self.regs.accumulator(), acc_width);
            }
            Mnemonic::Tya => {
                self.idle();
                self.regs.set_accumulator(self.regs.y());
                self.set_nz(self.regs.accumulator(), acc_width);
            }
            Mnemonic::Txy => {
                self.idle();
                self.regs.set_y(self.regs.x());
                self.set_nz(self.regs.y(), index_width);
            }
            Mnemonic::Tyx => {
                self.idle();
                self.regs.set_x(self.regs.y());
                self.set_nz(self.regs.x(), index_width);
            }
            Mnemonic::Tsx => {
                self.idle();
                self.regs.set_x(self.regs.s());
                self.set_nz(self.regs.x(), index_width);
            }
            Mnemonic::Txs => {
                self.idle();
                self.regs.set_s(self.regs.x());
            }
            Mnemonic::Tcs => {
                self.idle();
                self.regs.set_s(self.regs.a());
            }
            Mnemonic::Tsc => {
                self.idle();
                self.regs.set_a(self.regs.s());
                self.set_nz(self.regs.a(), Width::Word);
            }
            Mnemonic::Tcd => {
                self.idle();
                self.regs.set_d(self.regs.a());
                self.set_nz(self.regs.d(), Width::Word);
            }
            Mnemonic::Tdc => {
                self.idle();
                self.regs.set_a(self.regs.d());
                self.set_nz(self.regs.a(), Width::Word);
            }
            Mnemonic::Xba => {
                self.idle();
                self.idle();
                self.regs.set_a(self.regs.a().swap_bytes());
                self.set_nz(self.regs.a(), Width::Byte);
            }

            // Stack.
            Mnemonic::Pha => {
                self.idle();
                self.push_width(bus, acc_width, self.regs.accumulator());
            }
            Mnemonic::Phx => {
                self.idle();
                self.push_width(bus, index_width, self.regs.x());
            }
            Mnemonic::Phy => {
                self.idle();
                self.push_width(bus, index_width, self.regs.y());
            }
            Mnemonic::Php => {
                self.idle();
                self.push8(bus, self.regs.p());
            }
            Mnemonic::Phb => {
                self.idle();
                self.push8(bus, self.regs.dbr());
            }
            Mnemonic::Phk => {
                self.idle();
                self.push8(bus, self.regs.pbr());
            }
            Mnemonic::Phd => {
                self.idle();
                self.push16(bus, self.regs.d());
            }
            Mnemonic::Pla => {
                self.idle();
                self.idle();
                let value = self.pull_width(bus, acc_width);
                self.regs.set_accumulator(value);
                self.set_nz(value, acc_width);
            }
            Mnemonic::Plx => {
                self.idle();
                self.idle();
                let value = self.pull_width(bus, index_width);
                self.regs.set_x(value);
                self.set_nz(value, index_width);
            }
            Mnemonic::Ply => {
                self.idle();
                self.idle();
                let value = self.pull_width(bus, index_width);
                self.regs.set_y(value);
                self.set_nz(value, index_width);
            }
            Mnemonic::Plp => {
                self.idle();
                self.idle();
                let value = self.pull8(bus);
                self.regs.restore_p(value);
            }
            Mnemonic::Plb => {
                self.idle();
                self.idle();
                let value = self.pull8(bus);
                self.regs.set_dbr(value);
                self.set_nz(u16::from(value), Width::Byte);
            }
            Mnemonic::Pld => {
                self.idle();
                self.idle();
                let value = self.pull16(bus);
                self.regs.set_d(value);
                self.set_nz(value, Width::Word);
            }
            Mnemonic::Pea => {
                let value = self.fetch16(bus);
                self.push16(bus, value);
            }
            Mnemonic::Pei => {
                let pointer = self.direct_operand(bus);
                let value = self.read_word(bus, Target::Bank0(pointer));
                self.push16(bus, value);
            }
            Mnemonic::Per => {
                let offset = self.fetch16(bus);
                self.idle();
                self.push16(bus, self.regs.pc().wrapping_add(offset));
            }

            // Jumps, calls and returns.
            Mnemonic::Jmp => self.jump(bus, mode),
            Mnemonic::Jml => match mode {
                AddressingMode::AbsoluteIndirectLong => {
                    let pointer = self.fetch16(bus);
                    let target = self.read_long(bus, Target::Bank0(pointer));
                    self.long_jump(target);
                }
                _ => {
                    let target = self.fetch24(bus);
                    self.long_jump(target);
                }
            },
            Mnemonic::Jsr => match mode {
                AddressingMode::AbsoluteXIndirect => {
                    let low = self.fetch8(bus);
                    self.push16(bus, self.regs.pc());
                    let high = self.fetch8(bus);
                    self.idle();
                    let pointer = u16::from_le_bytes([low, high]).wrapping_add(self.regs.x());
                    let bank = u32::from(self.regs.pbr()) << 16;
                    let target = self.read_word(bus, Target::Long(bank | u32::from(pointer)));
                    self.regs.set_pc(target);
                }
                _ => {
                    let target = self.fetch16(bus);
                    self.idle();
                    self.push16(bus, self.regs.pc().wrapping_sub(1));
                    self.regs.set_pc(target);
                }
            },
            Mnemonic::Jsl => {
                let addr = self.fetch16(bus);
                self.push8(bus, self.regs.pbr());
                self.idle();
                let bank = self.fetch8(bus);
                self.push16(bus, self.regs.pc().wrapping_sub(1));
                self.regs.set_pbr(bank);
                self.regs.set_pc(addr);
            }
            Mnemonic::Rts => {
                self.idle();
                self.idle();
                let ret = self.pull16(bus);
                self.idle();
                self.regs.set_pc(ret.wrapping_add(1));
            }
            Mnemonic::Rtl => {
                self.idle();
                self.idle();
                let ret = self.pull16(bus);
                let bank = self.pull8(bus);
                self.regs.set_pc(ret.wrapping_add(1));
                self.regs.set_pbr(bank);
            }
            Mnemonic::Rti => {
                self.idle();
                self.idle();
                let status = self.pull8(bus);
                self.regs.restore_p(status);
                let ret = self.pull16(bus);
                self.regs.set_pc(ret);
                if !self.regs.emulation() {
                    let bank = self.pull8(bus);
                    self.regs.set_pbr(bank);
                }
            }
            Mnemonic::Brk => self.software_interrupt(bus, SoftwareInterrupt::Brk),
            Mnemonic::Cop => self.software_interrupt(bus, SoftwareInterrupt::Cop),

            // Block moves.
            Mnemonic::Mvn => self.block_move(bus, 1),
            Mnemonic::Mvp => self.block_move(bus, u16::MAX),

            // Processor control.
            Mnemonic::Nop => self.idle(),
            Mnemonic::Wdm => {
                self.fetch8(bus);
            }
            Mnemonic::Wai => {
                self.idle();
                self.idle();
                self.run_state = RunState::Waiting;
            }
            Mnemonic::Stp => {
                self.idle();
                self.idle();
                self.run_state = RunState::Stopped;
            }
        }
    }

    fn store(&mut self, bus: &mut dyn CpuBus, mode: AddressingMode, width: Width, value: u16) {
        let target = self.resolve(bus, mode, Access::Write);
        self.write_target(bus, target, width, value);
    }

    fn modify(&mut self, bus: &mut dyn CpuBus, mode: AddressingMode, op: ModifyOp) {
        let width = self.regs.accumulator_width();
        if mode == AddressingMode::Accumulator {
            self.idle();
            let value = self.regs.accumulator();
            let result = op(self, value, width);
            self.regs.set_accumulator(result);
        } else {
            let target = self.resolve(bus, mode, Access::Modify);
            let value = self.read_target(bus, target, width);
            self.idle();
            let result = op(self, value, width);
            self.write_target(bus, target, width, result);
        }
    }

    fn logic_result(&mut self, value: u16) {
        self.regs.set_accumulator(value);
        self.set_nz(value, self.regs.accumulator_width());
    }

    fn arith_result(&mut self, result: ArithResult) {
        self.regs.set_accumulator(result.value);
        self.regs.set_flag(FLAG_C, result.carry);
        self.regs.set_flag(FLAG_V, result.overflow);
        self.set_nz(result.value, self.regs.accumulator_width());
    }

    fn compare_with(&mut self, register: u16, operand: u16, width: Width) {
        let (difference, carry) = compare(register, operand, width);
        self.regs.set_flag(FLAG_C, carry);
        self.set_nz(difference, width);
    }

    fn change_flag(&mut self, mask: u8, enabled: bool) {
        self.idle();
        self.regs.set_flag(mask, enabled);
    }

    fn branch(&mut self, bus: &mut dyn CpuBus, taken: bool) {
        let offset = self.fetch8(bus) as i8;
        if !taken {
            return;
        }
        let pc = self.regs.pc();
        let dest = pc.wrapping_add_signed(i16::from(offset));
        self.idle();
        if self.regs.emulation() && (pc ^ dest) & 0xFF00 != 0 {
            self.idle();
        }
        self.regs.set_pc(dest);
    }

    fn jump(&mut self, bus: &mut dyn CpuBus, mode: AddressingMode) {
        let target = match mode {
            AddressingMode::AbsoluteIndirect => {
                let pointer = self.fetch16(bus);
                self.read_word(bus, Target::Bank0(pointer))
            }
            AddressingMode::AbsoluteXIndirect => {
                let pointer = self.fetch16(bus).wrapping_add(self.regs.x());
                self.idle();
                let bank = u32::from(self.regs.pbr()) << 16;
                self.read_word(bus, Target::Long(bank | u32::from(pointer)))
            }
            _ => self.fetch16(bus),
        };
        self.regs.set_pc(target);
    }

    fn long_jump(&mut self, target: u32) {
        self.regs.set_pbr((target >> 16) as u8);
        self.regs.set_pc(target as u16);
    }

    fn block_move(&mut self, bus: &mut dyn CpuBus, step: u16) {
        let dest_bank = self.fetch8(bus);
        let source_bank = self.fetch8(bus);
        self.regs.set_dbr(dest_bank);

        let source = (u32::from(source_bank) << 16) | u32::from(self.regs.x());
        let dest = (u32::from(dest_bank) << 16) | u32::from(self.regs.y());
        let value = self.read8(bus, source);
        self.write8(bus, dest, value);
        self.idle();
        self.idle();

        self.regs.set_x(self.regs.x().wrapping_add(step));
        self.regs.set_y(self.regs.y().wrapping_add(step));
        let remaining = self.regs.a().wrapping_sub(1);
        self.regs.set_a(remaining);
        if remaining != 0xFFFF {
            self.regs.set_pc(self.regs.pc().wrapping_sub(3));
        }
        debug_assert_eq!(self.step_cycles, BLOCK_MOVE_CYCLES_PER_BYTE);
    }

    fn shift_left(&mut self, value: u16, width: Width) -> u16 {
        self.regs.set_flag(FLAG_C, value & width.sign_bit() != 0);
        let result = (value << 1) & width.mask();
        self.set_nz(result, width);
        result
    }

    fn shift_right(&mut self, value: u16, width: Width) -> u16 {
        self.regs.set_flag(FLAG_C, value & 1 != 0);
        let result = (value & width.mask()) >> 1;
        self.set_nz(result, width);
        result
    }

    fn rotate_left(&mut self, value: u16, width: Width) -> u16 {
        let carry_in = u16::from(self.regs.flag(FLAG_C));
        self.regs.set_flag(FLAG_C, value & width.sign_bit() != 0);
        let result = ((value << 1) | carry_in) & width.mask();
        self.set_nz(result, width);
        result
    }

    fn rotate_right(&mut self, value: u16, width: Width) -> u16 {
        let carry_in = if self.regs.flag(FLAG_C) {
            width.sign_bit()
        } else {
            0
        };
        self.regs.set_flag(FLAG_C, value & 1 != 0);
        let result = ((value & width.mask()) >> 1) | carry_in;
        self.set_nz(result, width);
        result
    }

    fn increment(&mut self, value: u16, width: Width) -> u16 {
        let result = value.wrapping_add(1) & width.mask();
        self.set_nz(result, width);
        result
    }

    fn decrement(&mut self, value: u16, width: Width) -> u16 {
        let result = value.wrapping_sub(1) & width.mask();
        self.set_nz(result, width);
        result
    }

    fn test_and_set(&mut self, value: u16, width: Width) -> u16 {
        let a = self.regs.accumulator();
        self.regs.set_flag(FLAG_Z, a & value & width.mask() == 0);
        (value | a) & width.mask()
    }

    fn test_and_reset(&mut self, value: u16, width: Width) -> u16 {
        let a = self.regs.accumulator();
        self.regs.set_flag(FLAG_Z, a & value & width.mask() == 0);
        value & !a & width.mask()
    }
}
