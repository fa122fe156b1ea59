//! The instruction set architecture: opcodes, decoded instructions, and the
//! bit-level wire codec.
//!
//! Every instruction is one 16-bit wire word, in one of two layouts selected
//! by the top bit:
//!
//! ```text
//! Family 0 (embedded memory reference):
//! 0aaammmmmmmmmmmm
//!
//! Family 1 (register operands):
//! 1aaaaaaxsssstttt
//!
//! a = opcode (family 1 stores opcode - 7)
//! m = memory address or literal (12 bits = 4096)
//! s = source register
//! t = target register
//! ```
//!
//! All bit packing lives in [`Instruction::encode`] and all unpacking in
//! [`Instruction::decode`]; nothing else in the crate touches the wire layout.

use std::fmt;

use thiserror::Error;

/// An error from the instruction codec.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsaError {
    /// The decoded opcode value is outside the recognized set. Carries the
    /// opcode value and the full wire word it was unpacked from.
    #[error("invalid opcode: {opcode} ({word:#018b})")]
    InvalidOpcode { opcode: u16, word: u16 },
}

/// Type alias for Result<T, [IsaError]>.
pub type IsaResult<T> = Result<T, IsaError>;

/// Family-1 words store `opcode - 7`, so the lowest register-family opcode
/// (8) lands on field value 1.
const OPCODE_REBASE: u16 = 7;

/// The opcodes the machine recognizes.
///
/// Values 0-5 are family 0 (embedded 12-bit address or literal); values 8-21
/// are family 1 (register operands). 6 and 7 are unassigned and decode to
/// [`IsaError::InvalidOpcode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    /// `HLT`
    Halt = 0,
    /// `NOP`
    Noop = 1,
    /// `JMP ADDR`
    Jmp = 2,
    /// `JEQ ADDR`
    Jeq = 3,
    /// `JGT ADDR`
    Jgt = 4,
    /// `JLT ADDR`
    Jlt = 5,
    /// `SET TGT` followed by a literal word
    SetReg = 8,
    /// `LDR TGT` followed by an address word
    Load = 9,
    /// `STR SRC` followed by an address word
    Store = 10,
    /// `ADD SRC, TGT`
    Add = 11,
    /// `SUB SRC, TGT`
    Sub = 12,
    /// `MUL SRC, TGT`
    Mul = 13,
    /// `DIV SRC, TGT`
    Div = 14,
    /// `CMP SRC, TGT`
    Cmp = 15,
    /// `AND SRC, TGT`
    And = 16,
    /// `OR SRC, TGT`
    Or = 17,
    /// `XOR SRC, TGT`
    Xor = 18,
    /// `SHL AMT, TGT`
    Shl = 19,
    /// `SHR AMT, TGT`
    Shr = 20,
    /// `NOT TGT`
    Not = 21,
}

impl Opcode {
    /// The assembly mnemonic for this opcode.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Halt => "HLT",
            Self::Noop => "NOP",
            Self::Jmp => "JMP",
            Self::Jeq => "JEQ",
            Self::Jgt => "JGT",
            Self::Jlt => "JLT",
            Self::SetReg => "SET",
            Self::Load => "LDR",
            Self::Store => "STR",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Cmp => "CMP",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
            Self::Not => "NOT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction.
///
/// Each variant carries only the operand fields its opcode actually uses.
/// Instructions are ephemeral: the execution engine decodes one fresh from
/// memory every fetch and never stores or mutates it.
///
/// `SetReg`, `Load`, and `Store` take their literal/address operand from the
/// word *following* the instruction word in memory, not from the instruction
/// word itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Stop execution.
    Halt,
    /// Do nothing.
    Noop,
    /// Jump to the embedded address unconditionally.
    Jmp(u16),
    /// Jump to the embedded address if the equal state is set.
    Jeq(u16),
    /// Jump to the embedded address if the greater flag is set.
    Jgt(u16),
    /// Jump to the embedded address if the lesser flag is set.
    Jlt(u16),
    /// `register[tgt] <- next word` (literal).
    SetReg { tgt: u16 },
    /// `register[tgt] <- memory[next word]`.
    Load { tgt: u16 },
    /// `memory[next word] <- register[src]`.
    Store { src: u16 },
    /// `register[tgt] <- register[src] + register[tgt]`, sets overflow.
    Add { src: u16, tgt: u16 },
    /// `register[tgt] <- register[src] - register[tgt]`, sets overflow.
    Sub { src: u16, tgt: u16 },
    /// `register[tgt] <- register[src] * register[tgt]`, sets overflow.
    Mul { src: u16, tgt: u16 },
    /// `register[tgt] <- register[src] / register[tgt]`, truncating.
    Div { src: u16, tgt: u16 },
    /// Unsigned compare of `register[src]` against `register[tgt]`; sets
    /// exactly one of the equal/greater/lesser states.
    Cmp { src: u16, tgt: u16 },
    /// `register[tgt] <- register[src] & register[tgt]`.
    And { src: u16, tgt: u16 },
    /// `register[tgt] <- register[src] | register[tgt]`.
    Or { src: u16, tgt: u16 },
    /// `register[tgt] <- register[src] ^ register[tgt]`.
    Xor { src: u16, tgt: u16 },
    /// `register[tgt] <- register[tgt] << amount`. The source-register field
    /// is the shift amount itself, not a register index.
    Shl { amount: u16, tgt: u16 },
    /// `register[tgt] <- register[tgt] >> amount`.
    Shr { amount: u16, tgt: u16 },
    /// `register[tgt] <- !register[tgt]`.
    Not { tgt: u16 },
}

impl Instruction {
    /// The opcode this instruction dispatches on.
    pub fn opcode(self) -> Opcode {
        match self {
            Self::Halt => Opcode::Halt,
            Self::Noop => Opcode::Noop,
            Self::Jmp(_) => Opcode::Jmp,
            Self::Jeq(_) => Opcode::Jeq,
            Self::Jgt(_) => Opcode::Jgt,
            Self::Jlt(_) => Opcode::Jlt,
            Self::SetReg { .. } => Opcode::SetReg,
            Self::Load { .. } => Opcode::Load,
            Self::Store { .. } => Opcode::Store,
            Self::Add { .. } => Opcode::Add,
            Self::Sub { .. } => Opcode::Sub,
            Self::Mul { .. } => Opcode::Mul,
            Self::Div { .. } => Opcode::Div,
            Self::Cmp { .. } => Opcode::Cmp,
            Self::And { .. } => Opcode::And,
            Self::Or { .. } => Opcode::Or,
            Self::Xor { .. } => Opcode::Xor,
            Self::Shl { .. } => Opcode::Shl,
            Self::Shr { .. } => Opcode::Shr,
            Self::Not { .. } => Opcode::Not,
        }
    }

    /// The raw `(regsrc, regtgt, memloc)` operand fields, with zeros for the
    /// fields this instruction's opcode does not use.
    fn operands(self) -> (u16, u16, u16) {
        match self {
            Self::Halt | Self::Noop => (0, 0, 0),
            Self::Jmp(addr) | Self::Jeq(addr) | Self::Jgt(addr) | Self::Jlt(addr) => (0, 0, addr),
            Self::SetReg { tgt } | Self::Load { tgt } | Self::Not { tgt } => (0, tgt, 0),
            Self::Store { src } => (src, 0, 0),
            Self::Add { src, tgt }
            | Self::Sub { src, tgt }
            | Self::Mul { src, tgt }
            | Self::Div { src, tgt }
            | Self::Cmp { src, tgt }
            | Self::And { src, tgt }
            | Self::Or { src, tgt }
            | Self::Xor { src, tgt } => (src, tgt, 0),
            Self::Shl { amount, tgt } | Self::Shr { amount, tgt } => (amount, tgt, 0),
        }
    }

    /// Packs this instruction into its 16-bit wire word.
    ///
    /// Operands wider than their field are masked down, not rejected: a
    /// 13-bit address keeps its low 12 bits, a register index keeps its low
    /// 4 bits.
    pub fn encode(self) -> u16 {
        let op = self.opcode() as u16;
        let (src, tgt, mem) = self.operands();
        if op < 8 {
            (op << 12) | (mem & 0x0fff)
        } else {
            0x8000 | ((op - OPCODE_REBASE) << 9) | ((src & 0x000f) << 4) | (tgt & 0x000f)
        }
    }

    /// Unpacks a 16-bit wire word into an [`Instruction`].
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidOpcode`] if the word's opcode field holds a
    /// value outside the recognized set.
    pub fn decode(word: u16) -> IsaResult<Self> {
        let (op, src, tgt, mem) = if word & 0x8000 == 0 {
            ((word & 0x7000) >> 12, 0, 0, word & 0x0fff)
        } else {
            (
                ((word & 0x7e00) >> 9) + OPCODE_REBASE,
                (word & 0x00f0) >> 4,
                word & 0x000f,
                0,
            )
        };
        let inst = match op {
            0 => Self::Halt,
            1 => Self::Noop,
            2 => Self::Jmp(mem),
            3 => Self::Jeq(mem),
            4 => Self::Jgt(mem),
            5 => Self::Jlt(mem),
            8 => Self::SetReg { tgt },
            9 => Self::Load { tgt },
            10 => Self::Store { src },
            11 => Self::Add { src, tgt },
            12 => Self::Sub { src, tgt },
            13 => Self::Mul { src, tgt },
            14 => Self::Div { src, tgt },
            15 => Self::Cmp { src, tgt },
            16 => Self::And { src, tgt },
            17 => Self::Or { src, tgt },
            18 => Self::Xor { src, tgt },
            19 => Self::Shl { amount: src, tgt },
            20 => Self::Shr { amount: src, tgt },
            21 => Self::Not { tgt },
            _ => return Err(IsaError::InvalidOpcode { opcode: op, word }),
        };
        Ok(inst)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mn = self.opcode().mnemonic();
        match *self {
            Self::Halt | Self::Noop => write!(f, "{mn}"),
            Self::Jmp(addr) | Self::Jeq(addr) | Self::Jgt(addr) | Self::Jlt(addr) => {
                write!(f, "{mn} {addr:#05x}")
            }
            Self::SetReg { tgt } | Self::Load { tgt } | Self::Not { tgt } => {
                write!(f, "{mn} r{tgt}")
            }
            Self::Store { src } => write!(f, "{mn} r{src}"),
            Self::Add { src, tgt }
            | Self::Sub { src, tgt }
            | Self::Mul { src, tgt }
            | Self::Div { src, tgt }
            | Self::Cmp { src, tgt }
            | Self::And { src, tgt }
            | Self::Or { src, tgt }
            | Self::Xor { src, tgt } => write!(f, "{mn} r{src}, r{tgt}"),
            Self::Shl { amount, tgt } | Self::Shr { amount, tgt } => {
                write!(f, "{mn} {amount}, r{tgt}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(inst: Instruction) {
        let word = inst.encode();
        assert_eq!(
            Instruction::decode(word),
            Ok(inst),
            "round trip failed for {inst} ({word:#018b})"
        );
    }

    #[test]
    fn test_exact_bit_patterns() {
        assert_eq!(Instruction::Halt.encode(), 0b0000_0000_0000_0000);
        assert_eq!(Instruction::Noop.encode(), 0b0001_0000_0000_0000);
        assert_eq!(
            Instruction::SetReg { tgt: 1 }.encode(),
            0b1000_0010_0000_0001
        );
        assert_eq!(Instruction::Jmp(0x0abc).encode(), 0b0010_1010_1011_1100);
        assert_eq!(
            Instruction::Add { src: 5, tgt: 9 }.encode(),
            0b1000_1000_0101_1001
        );
    }

    #[test]
    fn test_round_trip_family_0() {
        for addr in [0, 1, 255, 256, 2048, 4095] {
            assert_round_trip(Instruction::Jmp(addr));
            assert_round_trip(Instruction::Jeq(addr));
            assert_round_trip(Instruction::Jgt(addr));
            assert_round_trip(Instruction::Jlt(addr));
        }
        assert_round_trip(Instruction::Halt);
        assert_round_trip(Instruction::Noop);
    }

    #[test]
    fn test_round_trip_family_1() {
        for src in 0..16 {
            for tgt in 0..16 {
                assert_round_trip(Instruction::Add { src, tgt });
                assert_round_trip(Instruction::Sub { src, tgt });
                assert_round_trip(Instruction::Mul { src, tgt });
                assert_round_trip(Instruction::Div { src, tgt });
                assert_round_trip(Instruction::Cmp { src, tgt });
                assert_round_trip(Instruction::And { src, tgt });
                assert_round_trip(Instruction::Or { src, tgt });
                assert_round_trip(Instruction::Xor { src, tgt });
                assert_round_trip(Instruction::Shl { amount: src, tgt });
                assert_round_trip(Instruction::Shr { amount: src, tgt });
            }
            assert_round_trip(Instruction::SetReg { tgt: src });
            assert_round_trip(Instruction::Load { tgt: src });
            assert_round_trip(Instruction::Store { src });
            assert_round_trip(Instruction::Not { tgt: src });
        }
    }

    #[test]
    fn test_encode_masks_wide_operands() {
        assert_eq!(
            Instruction::Jmp(0xffff).encode(),
            Instruction::Jmp(0x0fff).encode()
        );
        assert_eq!(
            Instruction::Add { src: 0x15, tgt: 0x29 }.encode(),
            Instruction::Add { src: 0x5, tgt: 0x9 }.encode()
        );
    }

    #[test]
    fn test_decode_invalid_opcode() {
        // Family-0 values 6 and 7 are unassigned.
        assert_eq!(
            Instruction::decode(0x6000),
            Err(IsaError::InvalidOpcode {
                opcode: 6,
                word: 0x6000
            })
        );
        assert_eq!(
            Instruction::decode(0x7123),
            Err(IsaError::InvalidOpcode {
                opcode: 7,
                word: 0x7123
            })
        );
        // All-ones decodes as family 1 with opcode field 63, i.e. opcode 70.
        assert_eq!(
            Instruction::decode(0xffff),
            Err(IsaError::InvalidOpcode {
                opcode: 70,
                word: 0xffff
            })
        );
        // A family-1 opcode field of 0 would map to the unassigned value 7.
        assert_eq!(
            Instruction::decode(0x8000),
            Err(IsaError::InvalidOpcode {
                opcode: 7,
                word: 0x8000
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::Halt.to_string(), "HLT");
        assert_eq!(Instruction::Jmp(0x100).to_string(), "JMP 0x100");
        assert_eq!(Instruction::Cmp { src: 2, tgt: 7 }.to_string(), "CMP r2, r7");
        assert_eq!(Instruction::Shl { amount: 3, tgt: 1 }.to_string(), "SHL 3, r1");
    }
}
