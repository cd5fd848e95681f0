//! Types shared by the opcode tables, the decoder and the executor.

use crate::cpu::registers::{Register16, Register8};

/// Operation kinds of the LR35902 instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    Add,
    And,
    Bit,
    Call,
    Ccf,
    Cpl,
    Cp,
    Daa,
    Dec,
    Di,
    Ei,
    Halt,
    Illegal,
    Inc,
    Jp,
    Jr,
    Ld,
    Noop,
    Or,
    Pop,
    Push,
    Res,
    Reti,
    Ret,
    Rla,
    Rlca,
    Rlc,
    Rl,
    Rra,
    Rrca,
    Rrc,
    Rr,
    Rst,
    Sbc,
    Scf,
    Set,
    Sla,
    Sra,
    Srl,
    Stop,
    Sub,
    Swap,
    Xor,
}

/// Branch conditions used by JR, JP, CALL and RET, named after the
/// mnemonic. [`resolve_condition`](crate::cpu::resolve::resolve_condition)
/// decides when each is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Always,
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

/// Register pairs that can be dereferenced as a memory pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerRegister {
    BC,
    DE,
    HL,
}

impl PointerRegister {
    pub const fn pair(self) -> Register16 {
        match self {
            Self::BC => Register16::BC,
            Self::DE => Register16::DE,
            Self::HL => Register16::HL,
        }
    }
}

/// Post-access adjustment of HL for `(hl+)` and `(hl-)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HlStep {
    Increment,
    Decrement,
}

/// A single operand of an instruction.
///
/// Table entries hold templates with zeroed payloads; the decoder splices the
/// immediate bytes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    None,
    Condition(Condition),
    Register(Register8),
    Pair(Register16),
    /// `(bc)`, `(de)` or `(hl)`
    Pointer(PointerRegister),
    /// `(hl+)` or `(hl-)`
    HlPointer(HlStep),
    /// `(0xff00+n)`
    IoOffset(u8),
    /// `(0xff00+c)`
    IoOffsetC,
    Imm8(u8),
    SignedImm8(i8),
    Imm16(u16),
    /// `(nn)`
    Imm16Pointer(u16),
    /// Literal encoded in the opcode itself (RST vector, bit index).
    Fixed(u8),
    /// `sp+e`
    SpOffset(i8),
}

impl Argument {
    /// Number of immediate bytes this operand consumes from the stream.
    pub const fn payload_size(&self) -> u8 {
        match self {
            Self::IoOffset(_) | Self::Imm8(_) | Self::SignedImm8(_) | Self::SpOffset(_) => 1,
            Self::Imm16(_) | Self::Imm16Pointer(_) => 2,
            Self::None
            | Self::Condition(_)
            | Self::Register(_)
            | Self::Pair(_)
            | Self::Pointer(_)
            | Self::HlPointer(_)
            | Self::IoOffsetC
            | Self::Fixed(_) => 0,
        }
    }

    /// Replaces the payload of a payload-bearing operand with immediate bytes.
    /// Other kinds are returned unchanged.
    #[must_use]
    pub const fn with_payload(self, lo: u8, hi: u8) -> Self {
        match self {
            Self::IoOffset(_) => Self::IoOffset(lo),
            Self::Imm8(_) => Self::Imm8(lo),
            Self::SignedImm8(_) => Self::SignedImm8(lo as i8),
            Self::SpOffset(_) => Self::SpOffset(lo as i8),
            Self::Imm16(_) => Self::Imm16(u16::from_le_bytes([lo, hi])),
            Self::Imm16Pointer(_) => Self::Imm16Pointer(u16::from_le_bytes([lo, hi])),
            other => other,
        }
    }
}

/// One entry of the base or CB-prefixed opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub lhs: Argument,
    pub rhs: Argument,
    /// Encoded length in bytes, including the 0xCB prefix where present.
    pub length: u8,
    /// Base cost in machine cycles.
    pub clocks: u8,
    /// Extra machine cycles charged when a control transfer is taken.
    pub branch_clocks: u8,
}

impl Opcode {
    pub const fn new(mnemonic: Mnemonic, lhs: Argument, rhs: Argument, length: u8, clocks: u8) -> Self {
        Self {
            mnemonic,
            lhs,
            rhs,
            length,
            clocks,
            branch_clocks: 0,
        }
    }

    #[must_use]
    pub const fn with_branch(self, branch_clocks: u8) -> Self {
        Self {
            branch_clocks,
            ..self
        }
    }

    /// Sum of the immediate bytes both operands expect.
    pub const fn payload_size(&self) -> u8 {
        self.lhs.payload_size() + self.rhs.payload_size()
    }
}

/// A decoded instruction with its immediate payload in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub lhs: Argument,
    pub rhs: Argument,
    pub length: u8,
    pub clocks: u8,
    pub branch_clocks: u8,
}

impl From<Opcode> for Instruction {
    fn from(op: Opcode) -> Self {
        Self {
            mnemonic: op.mnemonic,
            lhs: op.lhs,
            rhs: op.rhs,
            length: op.length,
            clocks: op.clocks,
            branch_clocks: op.branch_clocks,
        }
    }
}

impl Instruction {
    /// Machine cycles consumed, given whether the control transfer was taken.
    pub const fn cycles(&self, taken: bool) -> u32 {
        if taken {
            self.clocks as u32 + self.branch_clocks as u32
        } else {
            self.clocks as u32
        }
    }
}
