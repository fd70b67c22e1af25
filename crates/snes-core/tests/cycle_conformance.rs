//! Per-opcode cycle conformance against the published timing table, plus
//! fuzz-style robustness over random instruction streams.

#![allow(
    clippy::pedantic,
    clippy::nursery,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::panic::{self, AssertUnwindSafe};

use log as _;
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use snes_core::state::{FLAG_C, FLAG_M, FLAG_N, FLAG_V, FLAG_X, FLAG_Z};
use snes_core::timing::BLOCK_MOVE_CYCLES_PER_BYTE;
use snes_core::{
    base_cycles, decode_opcode, disassemble_one, Cpu, CpuBus, Mnemonic, StepOutcome,
    BASE_CYCLE_TABLE,
};
use thiserror as _;

/// Flat 16 MiB address space with no mapping rules.
struct FlatBus(Vec<u8>);

impl FlatBus {
    fn new() -> Self {
        Self(vec![0; 1 << 24])
    }
}

impl CpuBus for FlatBus {
    fn read(&mut self, addr: u32) -> u8 {
        self.0[(addr & 0xFF_FFFF) as usize]
    }

    fn write(&mut self, addr: u32, value: u8) {
        self.0[(addr & 0xFF_FFFF) as usize] = value;
    }
}

/// Native mode, 8-bit registers, `D = 0`, index registers zero, flags
/// chosen so conditional branches fall through.
fn reference_cpu(opcode: u8) -> Cpu {
    let mut cpu = Cpu::new();
    let regs = cpu.registers_mut();
    regs.set_emulation(false);
    let branch_falls_through = if matches!(opcode, 0x30 | 0x70 | 0xB0 | 0xF0) {
        0
    } else {
        FLAG_N | FLAG_V | FLAG_C | FLAG_Z
    };
    regs.set_p(FLAG_M | FLAG_X | branch_falls_through);
    regs.set_s(0x01FF);
    regs.set_pc(0x8000);
    cpu
}

#[test]
fn every_opcode_matches_the_published_cycle_count() {
    let mut mismatches = Vec::new();

    for opcode in 0..=u8::MAX {
        let mut bus = FlatBus::new();
        bus.0[0x8000] = opcode;
        let mut cpu = reference_cpu(opcode);

        let cycles = cpu.step(&mut bus);
        if cycles != u32::from(base_cycles(opcode)) {
            mismatches.push(format!(
                "{opcode:#04x} {:?}: got {cycles}, expected {}",
                decode_opcode(opcode).mnemonic,
                base_cycles(opcode)
            ));
        }
    }

    assert!(mismatches.is_empty(), "cycle mismatches:\n{}", mismatches.join("\n"));
}

#[test]
fn published_table_has_no_empty_slots() {
    assert!(BASE_CYCLE_TABLE.iter().all(|&cycles| (2..=8).contains(&cycles)));
}

#[test]
fn taken_branches_cost_one_more_and_page_cross_only_in_emulation() {
    let mut bus = FlatBus::new();
    bus.0[0x80F0] = 0x80;
    bus.0[0x80F1] = 0x20;

    let mut native = reference_cpu(0x80);
    native.registers_mut().set_pc(0x80F0);
    assert_eq!(native.step(&mut bus), 3);
    assert_eq!(native.registers().pc(), 0x8112);

    let mut emulation = Cpu::new();
    emulation.registers_mut().set_pc(0x80F0);
    assert_eq!(emulation.step(&mut bus), 4);
    assert_eq!(emulation.registers().pc(), 0x8112);
}

#[test]
fn sixteen_bit_operands_add_one_cycle_per_extra_byte() {
    let mut bus = FlatBus::new();
    bus.0[0x8000..0x8003].copy_from_slice(&[0xA9, 0x34, 0x12]);
    bus.0[0x8003..0x8006].copy_from_slice(&[0xAD, 0x00, 0x10]);

    let mut cpu = reference_cpu(0xA9);
    cpu.registers_mut().set_p(FLAG_X);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.registers().a(), 0x1234);
    assert_eq!(cpu.step(&mut bus), 5);
}

#[test]
fn direct_page_misalignment_costs_one_cycle() {
    let mut bus = FlatBus::new();
    bus.0[0x8000..0x8002].copy_from_slice(&[0xA5, 0x10]);

    let mut cpu = reference_cpu(0xA5);
    cpu.registers_mut().set_d(0x0001);
    assert_eq!(cpu.step(&mut bus), u32::from(base_cycles(0xA5)) + 1);
}

#[test]
fn indexed_reads_charge_page_crossing() {
    let mut bus = FlatBus::new();
    bus.0[0x8000..0x8003].copy_from_slice(&[0xBD, 0xF0, 0x10]);
    bus.0[0x8003..0x8006].copy_from_slice(&[0xBD, 0x00, 0x10]);

    let mut cpu = reference_cpu(0xBD);
    cpu.registers_mut().set_x(0x20);
    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.step(&mut bus), 4);
}

#[test]
fn block_move_charges_seven_cycles_per_byte() {
    let mut bus = FlatBus::new();
    bus.0[0x8000..0x8003].copy_from_slice(&[0x54, 0x00, 0x00]);

    let mut cpu = reference_cpu(0x54);
    cpu.registers_mut().set_a(0x0002);
    let per_byte: Vec<u32> = (0..3).map(|_| cpu.step(&mut bus)).collect();
    assert_eq!(per_byte, vec![BLOCK_MOVE_CYCLES_PER_BYTE; 3]);
    assert_eq!(cpu.registers().a(), 0xFFFF);
    assert_eq!(cpu.registers().pc(), 0x8003);
}

#[test]
fn every_opcode_disassembles_with_its_mnemonic() {
    for opcode in 0..=u8::MAX {
        let row = disassemble_one(|addr| if addr == 0x8000 { opcode } else { 0 }, 0x8000, true, true);
        let entry = decode_opcode(opcode);
        assert_eq!(row.mnemonic, entry.mnemonic.name());
        assert_eq!(row.bytes[0], opcode);
        assert!((1..=4).contains(&row.len));
    }
    assert_eq!(decode_opcode(0xEA).mnemonic, Mnemonic::Nop);
}

proptest! {
    #[test]
    fn property_random_streams_never_panic(
        program in prop::collection::vec(any::<u8>(), 1..=64),
        status in any::<u8>(),
        native in any::<bool>(),
        d in any::<u16>(),
        x in any::<u16>(),
        y in any::<u16>(),
    ) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut bus = FlatBus::new();
            bus.0[0x8000..0x8000 + program.len()].copy_from_slice(&program);
            let mut cpu = Cpu::new();
            let regs = cpu.registers_mut();
            regs.set_emulation(!native);
            regs.set_p(status);
            regs.set_d(d);
            regs.set_x(x);
            regs.set_y(y);
            regs.set_pc(0x8000);

            let mut per_step = Vec::new();
            for _ in 0..128 {
                let outcome = cpu.step_detailed(&mut bus);
                per_step.push(outcome.cycles());
                if matches!(outcome, StepOutcome::Stopped { .. }) {
                    break;
                }
            }
            (per_step, cpu.cycles())
        }));

        prop_assert!(result.is_ok());
        if let Ok((per_step, total)) = result {
            prop_assert!(per_step.iter().all(|&cycles| (1..=12).contains(&cycles)));
            prop_assert_eq!(per_step.iter().map(|&c| u64::from(c)).sum::<u64>(), total);
        }
    }

    #[test]
    fn property_identical_inputs_give_identical_runs(
        program in prop::collection::vec(any::<u8>(), 1..=32),
    ) {
        let run = || {
            let mut bus = FlatBus::new();
            bus.0[0x8000..0x8000 + program.len()].copy_from_slice(&program);
            let mut cpu = Cpu::new();
            cpu.registers_mut().set_pc(0x8000);
            let outcomes: Vec<StepOutcome> = (0..32).map(|_| cpu.step_detailed(&mut bus)).collect();
            (outcomes, *cpu.registers(), bus.0[..0x2_0000].to_vec())
        };
        prop_assert_eq!(run(), run());
    }
}
