//! Host-facing API: the bus contract the processor runs against, step and
//! run outcomes, tracing hooks, and the [`Machine`] that wires a [`Cpu`] to
//! a [`Bus`].

use std::fmt;

use crate::cpu::{
    Cpu, DEFAULT_RESET_FALLBACK_PC, IRQ_VECTOR_EMULATION, IRQ_VECTOR_NATIVE, NMI_VECTOR_EMULATION,
    NMI_VECTOR_NATIVE,
};
use crate::disasm::{disassemble_window, DisassemblyRow};
use crate::memory::{Bus, MappingScheme};
use crate::state::Width;

/// Default cycle budget per frame (NTSC, in CPU cycles).
pub const DEFAULT_CYCLES_PER_FRAME: u64 = 59_659;

/// Byte-wide 24-bit memory interface the processor executes against.
///
/// Every call is one bus cycle. Implementations decide what unmapped
/// addresses return; the processor never inspects the mapping.
pub trait CpuBus {
    /// Reads one byte from a 24-bit address.
    fn read(&mut self, addr: u32) -> u8;

    /// Writes one byte to a 24-bit address.
    fn write(&mut self, addr: u32, value: u8);
}

/// Hardware interrupt sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InterruptKind {
    /// Non-maskable interrupt (edge-latched).
    Nmi,
    /// Maskable interrupt request (level-sensitive).
    Irq,
}

impl InterruptKind {
    /// Bank-0 vector address for this interrupt in the given mode.
    #[must_use]
    pub const fn vector(self, emulation: bool) -> u16 {
        match (self, emulation) {
            (Self::Nmi, false) => NMI_VECTOR_NATIVE,
            (Self::Nmi, true) => NMI_VECTOR_EMULATION,
            (Self::Irq, false) => IRQ_VECTOR_NATIVE,
            (Self::Irq, true) => IRQ_VECTOR_EMULATION,
        }
    }
}

/// What a single processor step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StepOutcome {
    /// One instruction executed.
    Executed {
        /// Program bank the opcode was fetched from.
        pbr: u8,
        /// Address of the opcode byte within `pbr`.
        pc: u16,
        /// Opcode byte.
        opcode: u8,
        /// Cycles consumed.
        cycles: u32,
    },
    /// A hardware interrupt was serviced instead of an instruction.
    Interrupt {
        /// Interrupt source.
        kind: InterruptKind,
        /// Vector the handler address was loaded from.
        vector: u16,
        /// Cycles consumed.
        cycles: u32,
    },
    /// Processor is in `WAI` with no pending interrupt.
    Waiting {
        /// Cycles consumed.
        cycles: u32,
    },
    /// Processor is halted by `STP`.
    Stopped {
        /// Cycles consumed.
        cycles: u32,
    },
}

impl StepOutcome {
    /// Cycles consumed by this step.
    #[must_use]
    pub const fn cycles(self) -> u32 {
        match self {
            Self::Executed { cycles, .. }
            | Self::Interrupt { cycles, .. }
            | Self::Waiting { cycles }
            | Self::Stopped { cycles } => cycles,
        }
    }
}

/// Aggregate result of a bounded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Steps taken, interrupt entries and idle steps included.
    pub steps: u32,
    /// Cycles consumed. May exceed the budget by the last step's cost.
    pub cycles: u64,
}

/// Per-step trace events, emitted in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// An instruction was fetched.
    InstructionStart {
        /// Program bank of the opcode.
        pbr: u8,
        /// Address of the opcode within `pbr`.
        pc: u16,
        /// Opcode byte.
        opcode: u8,
    },
    /// The instruction announced by the preceding start event completed.
    InstructionRetired {
        /// Cycles consumed.
        cycles: u32,
    },
    /// A hardware interrupt handler was entered.
    InterruptEntered {
        /// Interrupt source.
        kind: InterruptKind,
        /// Vector used.
        vector: u16,
    },
}

/// Receiver for [`TraceEvent`]s.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Top-level configuration for a [`Machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Cycle budget for [`Machine::run_frame`].
    pub cycles_per_frame: u64,
    /// Entry point used when the reset vector is blank.
    pub reset_fallback_pc: u16,
    /// Enables dispatch to the installed trace sink.
    pub tracing_enabled: bool,
    /// Forces a mapping scheme instead of detecting it from the header.
    pub scheme_override: Option<MappingScheme>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            reset_fallback_pc: DEFAULT_RESET_FALLBACK_PC,
            tracing_enabled: false,
            scheme_override: None,
        }
    }
}

/// A processor wired to a memory bus.
pub struct Machine {
    cpu: Cpu,
    bus: Bus,
    config: MachineConfig,
    trace: Option<Box<dyn TraceSink>>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("cpu", &self.cpu)
            .field("bus", &self.bus)
            .field("config", &self.config)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

impl Machine {
    /// Creates a machine with an empty cartridge slot.
    #[must_use]
    pub fn new(config: MachineConfig) -> Self {
        Self {
            cpu: Cpu::with_reset_fallback(config.reset_fallback_pc),
            bus: Bus::new(),
            config,
            trace: None,
        }
    }

    /// Loads a cartridge image, honouring the configured scheme override.
    ///
    /// The processor is not reset; call [`Machine::reset`] afterwards.
    pub fn load_cartridge(&mut self, image: &[u8]) {
        self.bus.load_cartridge(image);
        if let Some(scheme) = self.config.scheme_override {
            self.bus.set_scheme(scheme);
        }
    }

    /// Resets the bus and then the processor, which loads the reset vector.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
    }

    /// Executes one step and returns its cycles.
    pub fn step(&mut self) -> u32 {
        self.step_detailed().cycles()
    }

    /// Executes one step, emitting trace events when enabled.
    pub fn step_detailed(&mut self) -> StepOutcome {
        let outcome = self.cpu.step_detailed(&mut self.bus);
        if self.config.tracing_enabled {
            if let Some(sink) = self.trace.as_mut() {
                emit_trace(sink.as_mut(), outcome);
            }
        }
        outcome
    }

    /// Steps until at least `budget` cycles have elapsed.
    ///
    /// Instructions are never split, so the total can overshoot by the cost
    /// of the final step.
    pub fn run_cycles(&mut self, budget: u64) -> RunOutcome {
        let mut outcome = RunOutcome::default();
        while outcome.cycles < budget {
            outcome.cycles += u64::from(self.step());
            outcome.steps = outcome.steps.saturating_add(1);
        }
        outcome
    }

    /// Runs one frame's worth of cycles, then latches an NMI when
    /// `deliver_nmi` is set, as the vertical blank would.
    pub fn run_frame(&mut self, deliver_nmi: bool) -> RunOutcome {
        let outcome = self.run_cycles(self.config.cycles_per_frame);
        if deliver_nmi {
            self.cpu.raise_nmi();
        }
        outcome
    }

    /// Disassembles `count` instructions starting at the current program
    /// address, using the live accumulator and index widths.
    #[must_use]
    pub fn disassemble_at_pc(&self, count: usize) -> Vec<DisassemblyRow> {
        let regs = self.cpu.registers();
        disassemble_window(
            |addr| self.bus.peek(addr),
            regs.program_address(),
            count,
            regs.accumulator_width() == Width::Byte,
            regs.index_width() == Width::Byte,
        )
    }

    /// Installs a trace sink; events flow only while tracing is enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn clear_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }

    /// Enables or disables trace dispatch.
    pub const fn set_tracing_enabled(&mut self, enabled: bool) {
        self.config.tracing_enabled = enabled;
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Processor.
    #[must_use]
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable processor, for raising interrupts or poking registers.
    pub const fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Memory bus.
    #[must_use]
    pub const fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable memory bus, for handler registration and save data.
    pub const fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

fn emit_trace(sink: &mut dyn TraceSink, outcome: StepOutcome) {
    match outcome {
        StepOutcome::Executed {
            pbr,
            pc,
            opcode,
            cycles,
        } => {
            sink.on_event(TraceEvent::InstructionStart { pbr, pc, opcode });
            sink.on_event(TraceEvent::InstructionRetired { cycles });
        }
        StepOutcome::Interrupt { kind, vector, .. } => {
            sink.on_event(TraceEvent::InterruptEntered { kind, vector });
        }
        StepOutcome::Waiting { .. } | StepOutcome::Stopped { .. } => {}
    }
}
