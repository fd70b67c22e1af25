//! Architectural CPU state: register file and run state.

/// 65C816 register file, status bits and operand widths.
pub mod registers;
/// Processor run-state machine (`Running`/`Waiting`/`Stopped`).
pub mod run_state;

pub use registers::{
    RegisterClass, Registers, Width, FLAG_B, FLAG_C, FLAG_D, FLAG_I, FLAG_M, FLAG_N, FLAG_V,
    FLAG_X, FLAG_Z, RESET_STACK, RESET_STATUS,
};
pub use run_state::RunState;
