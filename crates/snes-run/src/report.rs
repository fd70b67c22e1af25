//! Text rendering for runner output: header summary, register dump and
//! per-step trace lines.

use std::cell::Cell;
use std::rc::Rc;

use snes_core::{
    CartridgeHeader, Cpu, DisassemblyRow, InterruptKind, MappingScheme, StepOutcome, TraceEvent,
    TraceSink,
};

/// Status flag letters from bit 7 down to bit 0.
const FLAG_LETTERS: [char; 8] = ['n', 'v', 'm', 'x', 'd', 'i', 'z', 'c'];

/// Running totals gathered from trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub instructions: u64,
    pub interrupts: u64,
}

/// Trace sink feeding a [`Tally`] the caller keeps a handle to.
pub struct TallySink(pub Rc<Cell<Tally>>);

impl TraceSink for TallySink {
    fn on_event(&mut self, event: TraceEvent) {
        let mut tally = self.0.get();
        match event {
            TraceEvent::InstructionRetired { .. } => tally.instructions += 1,
            TraceEvent::InterruptEntered { .. } => tally.interrupts += 1,
            TraceEvent::InstructionStart { .. } => {}
        }
        self.0.set(tally);
    }
}

pub fn header_line(header: Option<&CartridgeHeader>, scheme: MappingScheme) -> String {
    let scheme = scheme_name(scheme);
    match header {
        Some(header) => format!(
            "cartridge: \"{}\" {scheme} map=${:02X} rom={}KiB sram={}KiB checksum={}",
            header.title,
            header.map_mode,
            header.rom_size_bytes() / 1024,
            header.sram_size_bytes() / 1024,
            if header.checksum_pair_valid() {
                "ok"
            } else {
                "bad"
            },
        ),
        None => format!("cartridge: no header {scheme}"),
    }
}

pub fn registers_line(cpu: &Cpu) -> String {
    let regs = cpu.registers();
    format!(
        "A={:04X} X={:04X} Y={:04X} S={:04X} D={:04X} DBR={:02X} PBR={:02X} PC={:04X} P={} E={} state={:?} cycles={}",
        regs.a(),
        regs.x(),
        regs.y(),
        regs.s(),
        regs.d(),
        regs.dbr(),
        regs.pbr(),
        regs.pc(),
        flag_string(regs.p()),
        u8::from(regs.emulation()),
        cpu.run_state(),
        cpu.cycles(),
    )
}

/// Upper-case letter for each set flag, lower-case for each clear one.
pub fn flag_string(p: u8) -> String {
    FLAG_LETTERS
        .iter()
        .enumerate()
        .map(|(index, &letter)| {
            if p & (0x80 >> index) != 0 {
                letter.to_ascii_uppercase()
            } else {
                letter
            }
        })
        .collect()
}

/// Line for one traced step. Idle steps produce nothing.
pub fn trace_line(row: Option<&DisassemblyRow>, outcome: StepOutcome) -> Option<String> {
    match outcome {
        StepOutcome::Executed { cycles, .. } => row.map(|row| {
            let text = row.to_string();
            format!("{text:<32} ; {cycles}")
        }),
        StepOutcome::Interrupt { kind, vector, .. } => {
            let name = match kind {
                InterruptKind::Nmi => "NMI",
                InterruptKind::Irq => "IRQ",
            };
            Some(format!("-- {name} via ${vector:04X}"))
        }
        StepOutcome::Waiting { .. } | StepOutcome::Stopped { .. } => None,
    }
}

const fn scheme_name(scheme: MappingScheme) -> &'static str {
    match scheme {
        MappingScheme::LoRom => "LoROM",
        MappingScheme::HiRom => "HiROM",
    }
}
