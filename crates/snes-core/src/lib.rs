//! 65C816 processor core and SNES-style banked memory bus.

/// Banked memory map, cartridge header parsing and the I/O bridge.
pub mod memory;
pub use memory::{
    detect_scheme, map_address, strip_copier_header, Bus, CartridgeHeader, IoHandler, IoReadFn,
    IoWriteFn, MappedAddress, MappingScheme, MemoryRegion, MmioDevice, SaveRamError, OPEN_BUS,
};

/// Register file and run-state model.
pub mod state;
pub use state::{RegisterClass, Registers, RunState, Width};

/// Host-facing bus contract, outcomes, tracing and the machine driver.
pub mod api;
pub use api::{
    CpuBus, InterruptKind, Machine, MachineConfig, RunOutcome, StepOutcome, TraceEvent, TraceSink,
};

/// Processor core.
pub mod cpu;
pub use cpu::Cpu;

/// Opcode map: mnemonic and addressing mode per opcode byte.
pub mod encoding;
pub use encoding::{decode_opcode, AddressingMode, Mnemonic, Opcode, OPCODE_TABLE};

/// Published per-opcode cycle counts.
pub mod timing;
pub use timing::{base_cycles, BASE_CYCLE_TABLE};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble_one, disassemble_window, DisassemblyRow};

mod execute;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
