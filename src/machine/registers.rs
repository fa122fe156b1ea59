//! The general-purpose register file and the status flags.

use crate::{machine::MachineError, REGISTER_COUNT};

bitflags::bitflags! {
    /// The machine's status flags byte.
    ///
    /// Bit 0 records arithmetic overflow; bits 1-2 record the outcome of the
    /// last CMP. The comparison bits are mutually exclusive, and both clear
    /// means "equal" — which makes a freshly zeroed machine compare equal
    /// until the first CMP runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        /// Set if the last arithmetic operation overflowed 16 bits.
        const OVERFLOW = 1 << 0;
        /// Set if the last CMP found source < target.
        const LESSER = 1 << 1;
        /// Set if the last CMP found source > target.
        const GREATER = 1 << 2;
    }
}

impl Flags {
    /// Marks the last comparison as equal, clearing both comparison bits.
    /// The overflow bit is untouched.
    pub fn set_equal(&mut self) {
        self.remove(Self::LESSER | Self::GREATER);
    }

    /// Marks the last comparison as greater. The overflow bit is untouched.
    pub fn set_greater(&mut self) {
        self.set_equal();
        self.insert(Self::GREATER);
    }

    /// Marks the last comparison as lesser. The overflow bit is untouched.
    pub fn set_lesser(&mut self) {
        self.set_equal();
        self.insert(Self::LESSER);
    }

    /// Sets the overflow bit. The comparison bits are untouched.
    pub fn set_overflow(&mut self) {
        self.insert(Self::OVERFLOW);
    }

    /// Clears the overflow bit. The comparison bits are untouched.
    pub fn clear_overflow(&mut self) {
        self.remove(Self::OVERFLOW);
    }

    pub fn equal(self) -> bool {
        !self.intersects(Self::LESSER | Self::GREATER)
    }

    pub fn greater(self) -> bool {
        self.contains(Self::GREATER)
    }

    pub fn lesser(self) -> bool {
        self.contains(Self::LESSER)
    }

    pub fn overflow(self) -> bool {
        self.contains(Self::OVERFLOW)
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::empty()
    }
}

/// The sixteen general-purpose 16-bit registers.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    regs: [u16; REGISTER_COUNT as usize],
}

impl RegisterFile {
    /// Creates a new [`RegisterFile`] with every register zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidRegister`] if `index` is out of range.
    pub fn get(&self, index: u16) -> Result<u16, MachineError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(MachineError::InvalidRegister(index))
    }

    /// Writes a register.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidRegister`] if `index` is out of range.
    pub fn set(&mut self, index: u16, value: u16) -> Result<(), MachineError> {
        let slot = self
            .regs
            .get_mut(index as usize)
            .ok_or(MachineError::InvalidRegister(index))?;
        *slot = value;
        Ok(())
    }
}
