//! The machine: registers, flags, memory, and the execution engine.

use thiserror::Error;

use crate::isa::IsaError;

pub mod machine;
pub mod memory;
pub mod registers;

/// An error raised while operating the machine.
///
/// Every failure is terminal for the [`run`](machine::Machine::run) that
/// raised it; the machine's state is left exactly as it was at the point of
/// failure so callers can inspect it.
#[derive(Debug, Error)]
pub enum MachineError {
    /// A memory access at an address outside [0, [`MEMORY_SIZE`](crate::MEMORY_SIZE)).
    #[error("invalid memory location: {0}")]
    InvalidMemoryLocation(u16),
    /// A register access at an index outside [0, [`REGISTER_COUNT`](crate::REGISTER_COUNT)).
    #[error("invalid register: {0}")]
    InvalidRegister(u16),
    /// A DIV instruction whose target register held zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The word fetched at the program counter did not decode to a known
    /// instruction.
    #[error(transparent)]
    Isa(#[from] IsaError),
}
