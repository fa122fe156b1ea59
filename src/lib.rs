//! A 16-bit virtual CPU.
//!
//! The machine model is deliberately small: sixteen general-purpose 16-bit
//! registers, a flat memory of 4096 16-bit cells, a one-byte flags register,
//! and a fetch-decode-execute loop over a compact two-family instruction
//! encoding (see [`isa`]).
//!
//! Programs are sequences of 16-bit wire words, produced by hand or by an
//! external assembler, written into memory with [`Machine::load`] or
//! [`Machine::set_memory`] and executed with [`Machine::run`]:
//!
//! ```
//! use bvm16::{Instruction, Machine, PROGRAM_START};
//!
//! let mut cpu = Machine::new();
//! cpu.load(
//!     PROGRAM_START,
//!     &[
//!         Instruction::SetReg { tgt: 0 }.encode(),
//!         42,
//!         Instruction::Halt.encode(),
//!     ],
//! )
//! .unwrap();
//! cpu.run().unwrap();
//! assert_eq!(cpu.get_register(0).unwrap(), 42);
//! ```

pub mod isa;
pub mod machine;

pub use isa::{Instruction, IsaError, Opcode};
pub use machine::{machine::Machine, MachineError};

/// Number of 16-bit cells in the machine's memory.
pub const MEMORY_SIZE: u16 = 4096;
/// Address where [`Machine::run`] begins execution. Addresses below this are
/// reserved by convention and never touched by the machine itself.
pub const PROGRAM_START: u16 = 256;
/// Number of general-purpose registers.
pub const REGISTER_COUNT: u16 = 16;
