//! Flat, bounds-checked memory of 16-bit cells.

use crate::{machine::MachineError, MEMORY_SIZE};

/// The machine's memory: [`MEMORY_SIZE`] 16-bit cells, zero-initialized.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Box<[u16]>,
}

impl Memory {
    /// Creates a new zeroed [`Memory`].
    pub fn new() -> Self {
        Self {
            cells: vec![0u16; MEMORY_SIZE as usize].into_boxed_slice(),
        }
    }

    /// Number of cells.
    pub fn size(&self) -> u16 {
        self.cells.len() as u16
    }

    /// Reads the cell at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidMemoryLocation`] if `location` is out
    /// of range.
    pub fn get(&self, location: u16) -> Result<u16, MachineError> {
        self.cells
            .get(location as usize)
            .copied()
            .ok_or(MachineError::InvalidMemoryLocation(location))
    }

    /// Writes the cell at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidMemoryLocation`] if `location` is out
    /// of range.
    pub fn set(&mut self, location: u16, value: u16) -> Result<(), MachineError> {
        let cell = self
            .cells
            .get_mut(location as usize)
            .ok_or(MachineError::InvalidMemoryLocation(location))?;
        *cell = value;
        Ok(())
    }

    /// Writes `words` contiguously starting at `base`.
    ///
    /// No relocation is performed: jump targets and address operands embedded
    /// in `words` must already be absolute for the chosen base.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::InvalidMemoryLocation`] if the sequence runs
    /// past the end of memory; cells before the offending address are already
    /// written at that point.
    pub fn load(&mut self, base: u16, words: &[u16]) -> Result<(), MachineError> {
        for (offset, word) in words.iter().enumerate() {
            self.set(base + offset as u16, *word)?;
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
