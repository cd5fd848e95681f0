//! Text rendering of decoded instructions.
//!
//! Output is lowercase `op lhs, rhs` with hexadecimal immediates, e.g.
//! `ld bc, 0xcafe`, `jr nz, 0xfe`, `ld (0xff00+c), a`. Signed offsets print
//! as their raw byte. Formatting never affects execution.

use crate::cpu::opcodes::{Argument, Condition, HlStep, Instruction, Mnemonic, PointerRegister};
use crate::cpu::registers::{Register16, Register8};
use crate::cpu::Decoder;
use std::fmt;

impl Mnemonic {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adc => "adc",
            Self::Add => "add",
            Self::And => "and",
            Self::Bit => "bit",
            Self::Call => "call",
            Self::Ccf => "ccf",
            Self::Cpl => "cpl",
            Self::Cp => "cp",
            Self::Daa => "daa",
            Self::Dec => "dec",
            Self::Di => "di",
            Self::Ei => "ei",
            Self::Halt => "halt",
            Self::Illegal => "illegal",
            Self::Inc => "inc",
            Self::Jp => "jp",
            Self::Jr => "jr",
            Self::Ld => "ld",
            Self::Noop => "noop",
            Self::Or => "or",
            Self::Pop => "pop",
            Self::Push => "push",
            Self::Res => "res",
            Self::Reti => "reti",
            Self::Ret => "ret",
            Self::Rla => "rla",
            Self::Rlca => "rlca",
            Self::Rlc => "rlc",
            Self::Rl => "rl",
            Self::Rra => "rra",
            Self::Rrca => "rrca",
            Self::Rrc => "rrc",
            Self::Rr => "rr",
            Self::Rst => "rst",
            Self::Sbc => "sbc",
            Self::Scf => "scf",
            Self::Set => "set",
            Self::Sla => "sla",
            Self::Sra => "sra",
            Self::Srl => "srl",
            Self::Stop => "stop",
            Self::Sub => "sub",
            Self::Swap => "swap",
            Self::Xor => "xor",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn register8_name(reg: Register8) -> &'static str {
    match reg {
        Register8::A => "a",
        Register8::F => "f",
        Register8::B => "b",
        Register8::C => "c",
        Register8::D => "d",
        Register8::E => "e",
        Register8::H => "h",
        Register8::L => "l",
    }
}

const fn register16_name(reg: Register16) -> &'static str {
    match reg {
        Register16::AF => "af",
        Register16::BC => "bc",
        Register16::DE => "de",
        Register16::HL => "hl",
        Register16::SP => "sp",
    }
}

impl Argument {
    /// Whether the operand renders as nothing (`None` or an unconditional branch).
    const fn is_silent(&self) -> bool {
        matches!(self, Self::None | Self::Condition(Condition::Always))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::None | Self::Condition(Condition::Always) => Ok(()),
            Self::Condition(Condition::NotZero) => f.write_str("nz"),
            Self::Condition(Condition::Zero) => f.write_str("z"),
            Self::Condition(Condition::NotCarry) => f.write_str("nc"),
            Self::Condition(Condition::Carry) => f.write_str("c"),
            Self::Register(reg) => f.write_str(register8_name(reg)),
            Self::Pair(reg) => f.write_str(register16_name(reg)),
            Self::Pointer(ptr) => match ptr {
                PointerRegister::BC => f.write_str("(bc)"),
                PointerRegister::DE => f.write_str("(de)"),
                PointerRegister::HL => f.write_str("(hl)"),
            },
            Self::HlPointer(HlStep::Increment) => f.write_str("(hl+)"),
            Self::HlPointer(HlStep::Decrement) => f.write_str("(hl-)"),
            Self::IoOffset(offset) => write!(f, "(0xff00+{offset:#04x})"),
            Self::IoOffsetC => f.write_str("(0xff00+c)"),
            Self::Imm8(value) | Self::Fixed(value) => write!(f, "{value:#04x}"),
            Self::SignedImm8(value) => write!(f, "{:#04x}", value as u8),
            Self::Imm16(value) => write!(f, "{value:#06x}"),
            Self::Imm16Pointer(addr) => write!(f, "({addr:#06x})"),
            Self::SpOffset(offset) => write!(f, "sp+{:#04x}", offset as u8),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic.name())?;
        let mut separator = " ";
        for arg in [self.lhs, self.rhs] {
            if arg.is_silent() {
                continue;
            }
            write!(f, "{separator}{arg}")?;
            separator = ", ";
        }
        Ok(())
    }
}

pub fn format_instruction(instr: &Instruction) -> String {
    instr.to_string()
}

/// One disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub offset: usize,
    pub bytes: Vec<u8>,
    pub text: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02x}")).collect();
        write!(f, "{:04x}  {:<9} {}", self.offset, hex.join(" "), self.text)
    }
}

/// Disassembles up to `count` instructions from the start of `bytes`.
pub fn disassemble(bytes: &[u8], count: usize) -> Vec<Line> {
    disassemble_from(bytes, 0, count)
}

/// Disassembles up to `count` instructions starting at `offset`.
pub fn disassemble_from(bytes: &[u8], offset: usize, count: usize) -> Vec<Line> {
    Decoder::at(bytes, offset)
        .take(count)
        .map(|(at, instr)| {
            let end = (at + usize::from(instr.length)).min(bytes.len());
            Line {
                offset: at,
                bytes: bytes[at..end].to_vec(),
                text: instr.to_string(),
            }
        })
        .collect()
}
