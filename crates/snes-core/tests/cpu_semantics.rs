//! Processor semantics exercised through a machine with a LoROM cartridge:
//! register widths, mode switches, interrupts, run states, decimal
//! arithmetic, block moves and calls.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use log as _;
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use snes_core::state::{FLAG_C, FLAG_D, FLAG_I, FLAG_N, FLAG_X, FLAG_Z};
use snes_core::timing::INTERRUPT_ENTRY_CYCLES;
use snes_core::{
    InterruptKind, Machine, MachineConfig, MappingScheme, RunState, StepOutcome, Width,
};
use thiserror as _;

const ROM_BYTES: usize = 0x1_0000;

/// Handler addresses installed in every test image.
const NMI_NATIVE_HANDLER: u16 = 0x9000;
const NMI_EMULATION_HANDLER: u16 = 0x9100;
const IRQ_NATIVE_HANDLER: u16 = 0x9200;
const IRQ_EMULATION_HANDLER: u16 = 0x9300;
const COP_NATIVE_HANDLER: u16 = 0x9400;

/// Writes `bytes` at a bank-0 program address of a LoROM image.
fn patch(rom: &mut [u8], addr: u16, bytes: &[u8]) {
    let offset = usize::from(addr - 0x8000);
    rom[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn image(code: &[u8]) -> Vec<u8> {
    let mut rom = vec![0xEA; ROM_BYTES];
    patch(&mut rom, 0x8000, code);
    patch(&mut rom, 0xFFE4, &COP_NATIVE_HANDLER.to_le_bytes());
    patch(&mut rom, 0xFFEA, &NMI_NATIVE_HANDLER.to_le_bytes());
    patch(&mut rom, 0xFFEE, &IRQ_NATIVE_HANDLER.to_le_bytes());
    patch(&mut rom, 0xFFFA, &NMI_EMULATION_HANDLER.to_le_bytes());
    patch(&mut rom, 0xFFFC, &0x8000_u16.to_le_bytes());
    patch(&mut rom, 0xFFFE, &IRQ_EMULATION_HANDLER.to_le_bytes());
    rom
}

fn boot(rom: &[u8]) -> Machine {
    let mut machine = Machine::new(MachineConfig {
        scheme_override: Some(MappingScheme::LoRom),
        ..MachineConfig::default()
    });
    machine.load_cartridge(rom);
    machine.reset();
    machine
}

fn boot_native(rom: &[u8]) -> Machine {
    let mut machine = boot(rom);
    machine.cpu_mut().registers_mut().set_emulation(false);
    machine
}

fn stack_byte(machine: &Machine, s: u16) -> u8 {
    machine.bus().peek(u32::from(s))
}

#[test]
fn reset_establishes_power_on_state() {
    let machine = boot(&image(&[]));
    let regs = machine.cpu().registers();
    assert_eq!(regs.pc(), 0x8000);
    assert_eq!(regs.s(), 0x01FF);
    assert_eq!(regs.p(), 0x34);
    assert!(regs.emulation());
    assert_eq!((regs.a(), regs.x(), regs.y(), regs.d()), (0, 0, 0, 0));
    assert_eq!((regs.pbr(), regs.dbr()), (0, 0));
    assert_eq!(machine.cpu().cycles(), 0);
    assert_eq!(machine.cpu().run_state(), RunState::Running);
}

#[rstest]
#[case(0x0000)]
#[case(0xFFFF)]
fn blank_reset_vector_uses_configured_fallback(#[case] vector: u16) {
    let mut rom = image(&[]);
    patch(&mut rom, 0xFFFC, &vector.to_le_bytes());
    let mut machine = Machine::new(MachineConfig {
        reset_fallback_pc: 0x8123,
        scheme_override: Some(MappingScheme::LoRom),
        ..MachineConfig::default()
    });
    machine.load_cartridge(&rom);
    machine.reset();
    assert_eq!(machine.cpu().registers().pc(), 0x8123);
}

#[test]
fn widening_then_loading_zero_sets_sixteen_bit_state() {
    // REP #$30; LDA #$0000; TAX
    let mut machine = boot(&image(&[0xC2, 0x30, 0xA9, 0x00, 0x00, 0xAA]));
    let cycles: Vec<u32> = (0..3).map(|_| machine.step()).collect();

    let regs = machine.cpu().registers();
    assert_eq!(regs.x(), 0);
    assert_eq!(regs.accumulator_width(), Width::Word);
    assert_eq!(regs.index_width(), Width::Word);
    assert!(machine.cpu().flag(FLAG_Z));
    assert_eq!(regs.pc(), 0x8006);
    assert!(regs.emulation());
    assert_eq!(regs.s(), 0x01FF);
    assert_eq!(cycles, vec![3, 3, 2]);
}

#[test]
fn interrupt_return_in_emulation_keeps_register_widths() {
    let mut rom = image(&[]);
    patch(&mut rom, NMI_EMULATION_HANDLER, &[0x40]);
    let mut machine = boot(&rom);
    machine.cpu_mut().set_flag(FLAG_D, true);
    machine.cpu_mut().raise_nmi();

    machine.step();
    assert_eq!(stack_byte(&machine, 0x01FD) & FLAG_X, 0);
    machine.step();

    let regs = machine.cpu().registers();
    assert_eq!(regs.pc(), 0x8000);
    assert_eq!(regs.index_width(), Width::Byte);
    assert_eq!(regs.accumulator_width(), Width::Byte);
    assert_eq!(regs.p(), 0x3C);
}

#[test]
fn eight_bit_accumulator_preserves_hidden_high_byte() {
    // LDA #$00
    let mut machine = boot(&image(&[0xA9, 0x00]));
    machine.cpu_mut().registers_mut().set_a(0x1234);
    machine.step();
    let regs = machine.cpu().registers();
    assert_eq!(regs.accumulator(), 0x00);
    assert_eq!(regs.a(), 0x1200);
    assert!(machine.cpu().flag(FLAG_Z));
}

#[test]
fn sixteen_bit_accumulator_sees_the_full_word() {
    // REP #$20; LDA #$8000; LDA #$0000
    let mut machine = boot_native(&image(&[0xC2, 0x20, 0xA9, 0x00, 0x80, 0xA9, 0x00, 0x00]));
    machine.step();
    machine.step();
    assert_eq!(machine.cpu().registers().a(), 0x8000);
    assert!(machine.cpu().flag(FLAG_N));
    assert!(!machine.cpu().flag(FLAG_Z));
    machine.step();
    assert!(machine.cpu().flag(FLAG_Z));
}

#[test]
fn setting_index_flag_clears_index_high_bytes() {
    // SEP #$10
    let mut machine = boot_native(&image(&[0xE2, 0x10]));
    let regs = machine.cpu_mut().registers_mut();
    regs.set_p(0x00);
    regs.set_x(0x1234);
    regs.set_y(0xABCD);
    machine.step();
    let regs = machine.cpu().registers();
    assert_eq!((regs.x(), regs.y()), (0x0034, 0x00CD));
    assert!(regs.flag(FLAG_X));
}

#[test]
fn entering_emulation_truncates_stack_and_widths() {
    // SEC; XCE
    let mut machine = boot_native(&image(&[0x38, 0xFB]));
    let regs = machine.cpu_mut().registers_mut();
    regs.set_p(0x00);
    regs.set_s(0x1234);
    regs.set_x(0x5678);
    machine.step();
    machine.step();

    let regs = machine.cpu().registers();
    assert!(regs.emulation());
    assert_eq!(regs.s(), 0x0134);
    assert_eq!(regs.x(), 0x0078);
    assert_eq!(regs.accumulator_width(), Width::Byte);
    assert_eq!(regs.index_width(), Width::Byte);
    assert!(!machine.cpu().flag(FLAG_C));
}

#[test]
fn leaving_emulation_changes_no_registers() {
    // CLC; XCE
    let mut machine = boot(&image(&[0x18, 0xFB]));
    machine.step();
    let before = *machine.cpu().registers();
    machine.step();
    let after = machine.cpu().registers();
    assert!(!after.emulation());
    assert!(after.flag(FLAG_C));
    assert_eq!((after.a(), after.x(), after.y()), (before.a(), before.x(), before.y()));
    assert_eq!(after.s(), before.s());
    assert_eq!(after.p() & !FLAG_C, before.p() & !FLAG_C);
}

#[test]
fn nmi_in_emulation_pushes_three_bytes_and_vectors() {
    let mut machine = boot(&image(&[]));
    machine.cpu_mut().set_flag(FLAG_D, true);
    machine.cpu_mut().raise_nmi();

    let outcome = machine.step_detailed();
    assert_eq!(
        outcome,
        StepOutcome::Interrupt {
            kind: InterruptKind::Nmi,
            vector: 0xFFFA,
            cycles: INTERRUPT_ENTRY_CYCLES,
        }
    );

    let regs = machine.cpu().registers();
    assert_eq!(regs.pc(), NMI_EMULATION_HANDLER);
    assert_eq!(regs.s(), 0x01FC);
    assert!(machine.cpu().flag(FLAG_I));
    assert!(!machine.cpu().flag(FLAG_D));
    assert!(!machine.cpu().nmi_pending());
    assert_eq!(stack_byte(&machine, 0x01FF), 0x80);
    assert_eq!(stack_byte(&machine, 0x01FE), 0x00);
    assert_eq!(stack_byte(&machine, 0x01FD), 0x2C);
}

#[test]
fn nmi_in_native_mode_also_pushes_program_bank() {
    let mut machine = boot_native(&image(&[]));
    machine.step();
    machine.cpu_mut().set_nmi_pending(true);

    assert_eq!(machine.step(), INTERRUPT_ENTRY_CYCLES);
    let regs = machine.cpu().registers();
    assert_eq!(regs.pc(), NMI_NATIVE_HANDLER);
    assert_eq!(regs.pbr(), 0);
    assert_eq!(regs.s(), 0x01FB);
    assert_eq!(stack_byte(&machine, 0x01FF), 0x00);
    assert_eq!(stack_byte(&machine, 0x01FE), 0x80);
    assert_eq!(stack_byte(&machine, 0x01FD), 0x01);
    assert_eq!(stack_byte(&machine, 0x01FC), 0x34);
}

#[test]
fn nmi_takes_priority_over_irq() {
    let mut machine = boot_native(&image(&[]));
    machine.cpu_mut().set_flag(FLAG_I, false);
    machine.cpu_mut().set_irq_line(true);
    machine.cpu_mut().raise_nmi();
    assert!(matches!(
        machine.step_detailed(),
        StepOutcome::Interrupt {
            kind: InterruptKind::Nmi,
            ..
        }
    ));
    assert!(machine.cpu().irq_pending());
}

#[test]
fn irq_is_level_triggered() {
    let mut rom = image(&[]);
    // Handler: NOP; RTI
    patch(&mut rom, IRQ_NATIVE_HANDLER, &[0xEA, 0x40]);
    let mut machine = boot_native(&rom);
    machine.cpu_mut().set_flag(FLAG_I, false);
    machine.cpu_mut().set_irq_line(true);

    assert!(matches!(
        machine.step_detailed(),
        StepOutcome::Interrupt {
            kind: InterruptKind::Irq,
            vector: 0xFFEE,
            cycles: INTERRUPT_ENTRY_CYCLES,
        }
    ));
    assert!(machine.cpu().irq_pending());

    // Masked inside the handler even though the line is still raised.
    assert!(matches!(
        machine.step_detailed(),
        StepOutcome::Executed { opcode: 0xEA, .. }
    ));

    machine.cpu_mut().set_irq_line(false);
    assert!(matches!(
        machine.step_detailed(),
        StepOutcome::Executed { opcode: 0x40, .. }
    ));
    assert_eq!(machine.cpu().registers().pc(), 0x8000);
    assert!(!machine.cpu().flag(FLAG_I));
    assert!(matches!(
        machine.step_detailed(),
        StepOutcome::Executed { pc: 0x8000, .. }
    ));
}

#[test]
fn wai_sleeps_until_an_interrupt_line_rises() {
    // WAI; NOP
    let mut machine = boot(&image(&[0xCB, 0xEA]));
    assert_eq!(machine.step(), 3);
    assert_eq!(machine.cpu().run_state(), RunState::Waiting);
    assert_eq!(machine.step_detailed(), StepOutcome::Waiting { cycles: 1 });

    // I is set after reset: the IRQ wakes the processor but is not serviced.
    machine.cpu_mut().set_irq_line(true);
    assert!(matches!(
        machine.step_detailed(),
        StepOutcome::Executed {
            pc: 0x8001,
            opcode: 0xEA,
            ..
        }
    ));
    assert_eq!(machine.cpu().run_state(), RunState::Running);
}

#[test]
fn wai_resumes_into_the_nmi_handler() {
    let mut machine = boot(&image(&[0xCB]));
    machine.step();
    machine.cpu_mut().raise_nmi();
    assert!(matches!(
        machine.step_detailed(),
        StepOutcome::Interrupt {
            kind: InterruptKind::Nmi,
            ..
        }
    ));
    assert_eq!(machine.cpu().registers().pc(), NMI_EMULATION_HANDLER);
}

#[test]
fn stp_halts_until_reset() {
    let mut machine = boot(&image(&[0xDB]));
    machine.step();
    assert_eq!(machine.cpu().run_state(), RunState::Stopped);

    machine.cpu_mut().raise_nmi();
    assert_eq!(machine.step_detailed(), StepOutcome::Stopped { cycles: 1 });
    assert_eq!(machine.cpu().registers().pc(), 0x8001);

    machine.reset();
    assert_eq!(machine.cpu().run_state(), RunState::Running);
    assert_eq!(machine.cpu().registers().pc(), 0x8000);
}

#[test]
fn brk_in_emulation_sets_break_bit_on_stack() {
    let mut machine = boot(&image(&[0x00, 0xAA]));
    assert_eq!(machine.step(), 7);
    assert_eq!(machine.cpu().registers().pc(), IRQ_EMULATION_HANDLER);
    assert_eq!(stack_byte(&machine, 0x01FF), 0x80);
    assert_eq!(stack_byte(&machine, 0x01FE), 0x02);
    assert_eq!(stack_byte(&machine, 0x01FD) & 0x10, 0x10);
}

#[test]
fn cop_in_native_mode_uses_its_own_vector() {
    let mut machine = boot_native(&image(&[0x02, 0x00]));
    assert_eq!(machine.step(), 8);
    assert_eq!(machine.cpu().registers().pc(), COP_NATIVE_HANDLER);
    assert_eq!(machine.cpu().registers().s(), 0x01FB);
}

#[rstest]
// SED; CLC; LDA #$15; ADC #$27
#[case(&[0xF8, 0x18, 0xA9, 0x15, 0x69, 0x27], 0x42, false)]
// SED; CLC; LDA #$99; ADC #$01
#[case(&[0xF8, 0x18, 0xA9, 0x99, 0x69, 0x01], 0x00, true)]
// SED; SEC; LDA #$42; SBC #$15
#[case(&[0xF8, 0x38, 0xA9, 0x42, 0xE9, 0x15], 0x27, true)]
// SED; SEC; LDA #$00; SBC #$01
#[case(&[0xF8, 0x38, 0xA9, 0x00, 0xE9, 0x01], 0x99, false)]
// CLD; CLC; LDA #$15; ADC #$27 (binary)
#[case(&[0xD8, 0x18, 0xA9, 0x15, 0x69, 0x27], 0x3C, false)]
fn decimal_mode_arithmetic(#[case] code: &[u8], #[case] result: u16, #[case] carry: bool) {
    let mut machine = boot(&image(code));
    for _ in 0..4 {
        machine.step();
    }
    assert_eq!(machine.cpu().registers().accumulator(), result);
    assert_eq!(machine.cpu().flag(FLAG_C), carry);
}

#[test]
fn binary_overflow_uses_sign_bit_of_active_width() {
    // CLC; LDA #$7F; ADC #$01
    let mut machine = boot(&image(&[0x18, 0xA9, 0x7F, 0x69, 0x01]));
    for _ in 0..3 {
        machine.step();
    }
    assert_eq!(machine.cpu().registers().accumulator(), 0x80);
    assert!(machine.cpu().flag(snes_core::state::FLAG_V));
    assert!(machine.cpu().flag(FLAG_N));
}

fn block_move_machine(opcode: u8, x: u16, y: u16) -> Machine {
    // MVN/MVP dest=$7F src=$7E
    let mut machine = boot_native(&image(&[opcode, 0x7F, 0x7E]));
    for (offset, value) in [0x11_u8, 0x22, 0x33, 0x44].into_iter().enumerate() {
        machine.bus_mut().write(0x7E_1000 + offset as u32, value);
    }
    let regs = machine.cpu_mut().registers_mut();
    regs.set_p(0x00);
    regs.set_a(0x0003);
    regs.set_x(x);
    regs.set_y(y);
    machine
}

#[test]
fn mvn_copies_ascending_one_byte_per_step() {
    let mut machine = block_move_machine(0x54, 0x1000, 0x2000);
    let mut steps = 0;
    while machine.cpu().registers().pc() == 0x8000 {
        assert_eq!(machine.step(), 7);
        steps += 1;
    }
    assert_eq!(steps, 4);

    let regs = machine.cpu().registers();
    assert_eq!((regs.a(), regs.x(), regs.y()), (0xFFFF, 0x1004, 0x2004));
    assert_eq!(regs.dbr(), 0x7F);
    assert_eq!(regs.pc(), 0x8003);
    let copied: Vec<u8> = (0..4).map(|i| machine.bus().peek(0x7F_2000 + i)).collect();
    assert_eq!(copied, vec![0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn mvp_copies_descending() {
    let mut machine = block_move_machine(0x44, 0x1003, 0x2003);
    while machine.cpu().registers().pc() == 0x8000 {
        machine.step();
    }
    let regs = machine.cpu().registers();
    assert_eq!((regs.x(), regs.y()), (0x0FFF, 0x1FFF));
    let copied: Vec<u8> = (0..4).map(|i| machine.bus().peek(0x7F_2000 + i)).collect();
    assert_eq!(copied, vec![0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn jsl_and_rtl_cross_banks() {
    let mut rom = image(&[0x22, 0x00, 0x80, 0x01]);
    // Bank 0x01, address 0x8000 lives at ROM offset 0x8000 under LoROM: RTL.
    rom[0x8000] = 0x6B;
    let mut machine = boot_native(&rom);

    assert_eq!(machine.step(), 8);
    let regs = machine.cpu().registers();
    assert_eq!((regs.pbr(), regs.pc()), (0x01, 0x8000));
    assert_eq!(regs.s(), 0x01FC);

    assert_eq!(machine.step(), 6);
    let regs = machine.cpu().registers();
    assert_eq!((regs.pbr(), regs.pc()), (0x00, 0x8004));
    assert_eq!(regs.s(), 0x01FF);
}

#[test]
fn jsr_and_rts_return_after_the_call() {
    let mut rom = image(&[0x20, 0x00, 0x90]);
    patch(&mut rom, 0x9000, &[0x60]);
    let mut machine = boot(&rom);
    assert_eq!(machine.step(), 6);
    assert_eq!(machine.cpu().registers().pc(), 0x9000);
    assert_eq!(machine.step(), 6);
    assert_eq!(machine.cpu().registers().pc(), 0x8003);
}

#[test]
fn direct_page_wraps_within_bank_zero() {
    // LDA $10 with D = $FFF8 reads $0008 in bank 0.
    let mut machine = boot_native(&image(&[0xA5, 0x10]));
    machine.cpu_mut().registers_mut().set_d(0xFFF8);
    machine.bus_mut().write(0x00_0008, 0x5A);
    machine.step();
    assert_eq!(machine.cpu().registers().accumulator(), 0x5A);
}

#[test]
fn absolute_long_indexed_crosses_banks() {
    // LDA $7EFFFF,X with X = 1 reads $7F0000.
    let mut machine = boot(&image(&[0xBF, 0xFF, 0xFF, 0x7E]));
    machine.cpu_mut().registers_mut().set_x(1);
    machine.bus_mut().write(0x7F_0000, 0xC3);
    machine.step();
    assert_eq!(machine.cpu().registers().accumulator(), 0xC3);
}

#[test]
fn status_flag_helpers_follow_current_width() {
    let mut machine = boot_native(&image(&[]));
    machine.cpu_mut().registers_mut().set_p(0x00);
    machine
        .cpu_mut()
        .update_negative_flag(0x0080, snes_core::RegisterClass::Accumulator);
    assert!(!machine.cpu().flag(FLAG_N));
    machine
        .cpu_mut()
        .update_negative_flag(0x8000, snes_core::RegisterClass::Index);
    assert!(machine.cpu().flag(FLAG_N));
}
