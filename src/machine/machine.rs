//! The machine itself: program counter plus the fetch-decode-execute engine.

use crate::{
    isa::Instruction,
    machine::{
        memory::Memory,
        registers::{Flags, RegisterFile},
        MachineError,
    },
    PROGRAM_START,
};

/// A complete 16-bit virtual CPU.
///
/// The machine is a single owned aggregate of program counter, memory,
/// registers, and flags, with no global state, so any number of instances
/// can run in isolation. Everything is zero-initialized except the program
/// counter, which starts at [`PROGRAM_START`].
///
/// Execution is single-threaded and fully synchronous: [`run`](Self::run)
/// executes start to finish without yielding. A program that never reaches
/// HALT, an invalid opcode, or a bounds error loops forever; callers that
/// need a bound must impose their own watchdog.
#[derive(Debug, Clone)]
pub struct Machine {
    pc: u16,
    memory: Memory,
    registers: RegisterFile,
    flags: Flags,
}

impl Machine {
    /// Creates a new zeroed [`Machine`].
    pub fn new() -> Self {
        Self {
            pc: PROGRAM_START,
            memory: Memory::new(),
            registers: RegisterFile::new(),
            flags: Flags::default(),
        }
    }

    /// The address of the next word to fetch.
    pub fn program_counter(&self) -> u16 {
        self.pc
    }

    /// Number of memory cells.
    pub fn memory_size(&self) -> u16 {
        self.memory.size()
    }

    /// Reads the memory cell at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidMemoryLocation`] if `location` is out
    /// of range.
    pub fn get_memory(&self, location: u16) -> Result<u16, MachineError> {
        self.memory.get(location)
    }

    /// Writes the memory cell at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidMemoryLocation`] if `location` is out
    /// of range.
    pub fn set_memory(&mut self, location: u16, value: u16) -> Result<(), MachineError> {
        self.memory.set(location, value)
    }

    /// Writes a program (a sequence of wire words) contiguously into memory
    /// starting at `base`. Embedded addresses are not relocated.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidMemoryLocation`] if the sequence runs
    /// past the end of memory.
    pub fn load(&mut self, base: u16, words: &[u16]) -> Result<(), MachineError> {
        self.memory.load(base, words)
    }

    /// Reads a register.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidRegister`] if `index` is out of range.
    pub fn get_register(&self, index: u16) -> Result<u16, MachineError> {
        self.registers.get(index)
    }

    /// Writes a register.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidRegister`] if `index` is out of range.
    pub fn set_register(&mut self, index: u16, value: u16) -> Result<(), MachineError> {
        self.registers.set(index, value)
    }

    pub fn get_overflow(&self) -> bool {
        self.flags.overflow()
    }

    pub fn get_equal(&self) -> bool {
        self.flags.equal()
    }

    pub fn get_greater(&self) -> bool {
        self.flags.greater()
    }

    pub fn get_lesser(&self) -> bool {
        self.flags.lesser()
    }

    /// Fetches the next word at the program counter and advances past it.
    fn fetch(&mut self) -> Result<u16, MachineError> {
        let word = self.memory.get(self.pc)?;
        self.pc += 1;
        Ok(word)
    }

    /// Performs a widened arithmetic op from `src` and `tgt` into `tgt`,
    /// setting the overflow flag iff the wide result doesn't fit in 16 bits.
    fn arithmetic(
        &mut self,
        src: u16,
        tgt: u16,
        op: impl FnOnce(i32, i32) -> i32,
    ) -> Result<(), MachineError> {
        let wide = op(
            i32::from(self.registers.get(src)?),
            i32::from(self.registers.get(tgt)?),
        );
        self.registers.set(tgt, wide as u16)?;
        if (0..=i32::from(u16::MAX)).contains(&wide) {
            self.flags.clear_overflow();
        } else {
            self.flags.set_overflow();
        }
        Ok(())
    }

    /// Combines `src` and `tgt` bitwise into `tgt`. Flags are untouched.
    fn bitwise(
        &mut self,
        src: u16,
        tgt: u16,
        op: impl FnOnce(u16, u16) -> u16,
    ) -> Result<(), MachineError> {
        let value = op(self.registers.get(src)?, self.registers.get(tgt)?);
        self.registers.set(tgt, value)
    }

    /// Runs the machine until it halts or fails.
    ///
    /// The program counter is always reset to [`PROGRAM_START`] first; `run`
    /// never resumes a previous position.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Isa`] when a fetched word does not decode,
    /// [`MachineError::DivisionByZero`] on a DIV whose target register holds
    /// zero, and a bounds error when the program counter or an inline
    /// operand walks outside memory. All failures abort the run and leave
    /// the machine's state as it was for inspection.
    pub fn run(&mut self) -> Result<(), MachineError> {
        self.pc = PROGRAM_START;
        loop {
            let word = self.fetch()?;
            let inst = Instruction::decode(word)?;
            log::debug!("{:#05x}: {}", self.pc - 1, inst);
            match inst {
                Instruction::Halt => break,
                Instruction::Noop => {}
                Instruction::Jmp(addr) => self.pc = addr,
                Instruction::Jeq(addr) => {
                    if self.flags.equal() {
                        self.pc = addr;
                    }
                }
                Instruction::Jgt(addr) => {
                    if self.flags.greater() {
                        self.pc = addr;
                    }
                }
                Instruction::Jlt(addr) => {
                    if self.flags.lesser() {
                        self.pc = addr;
                    }
                }
                Instruction::SetReg { tgt } => {
                    let literal = self.fetch()?;
                    self.registers.set(tgt, literal)?;
                }
                Instruction::Load { tgt } => {
                    let addr = self.fetch()?;
                    let value = self.memory.get(addr)?;
                    self.registers.set(tgt, value)?;
                }
                Instruction::Store { src } => {
                    let addr = self.fetch()?;
                    let value = self.registers.get(src)?;
                    self.memory.set(addr, value)?;
                }
                Instruction::Add { src, tgt } => self.arithmetic(src, tgt, |a, b| a + b)?,
                Instruction::Sub { src, tgt } => self.arithmetic(src, tgt, |a, b| a - b)?,
                Instruction::Mul { src, tgt } => {
                    // A full u16 product can exceed i32::MAX; the wrapped
                    // value is always negative, so the overflow rule holds.
                    self.arithmetic(src, tgt, |a, b| a.wrapping_mul(b))?
                }
                Instruction::Div { src, tgt } => {
                    if self.registers.get(tgt)? == 0 {
                        return Err(MachineError::DivisionByZero);
                    }
                    self.arithmetic(src, tgt, |a, b| a / b)?;
                }
                Instruction::Cmp { src, tgt } => {
                    let a = self.registers.get(src)?;
                    let b = self.registers.get(tgt)?;
                    if a == b {
                        self.flags.set_equal();
                    } else if a > b {
                        self.flags.set_greater();
                    } else {
                        self.flags.set_lesser();
                    }
                }
                Instruction::And { src, tgt } => self.bitwise(src, tgt, |a, b| a & b)?,
                Instruction::Or { src, tgt } => self.bitwise(src, tgt, |a, b| a | b)?,
                Instruction::Xor { src, tgt } => self.bitwise(src, tgt, |a, b| a ^ b)?,
                Instruction::Shl { amount, tgt } => {
                    let value = self.registers.get(tgt)?;
                    self.registers.set(tgt, value << amount)?;
                }
                Instruction::Shr { amount, tgt } => {
                    let value = self.registers.get(tgt)?;
                    self.registers.set(tgt, value >> amount)?;
                }
                Instruction::Not { tgt } => {
                    let value = self.registers.get(tgt)?;
                    self.registers.set(tgt, !value)?;
                }
            }
        }
        log::trace!("halted at {:#05x}", self.pc);
        Ok(())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
