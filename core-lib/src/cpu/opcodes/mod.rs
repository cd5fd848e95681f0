//! Opcode tables and the instruction executor.
//!
//! `OPCODES` and `CB_OPCODES` map every byte to the shape of its instruction:
//! mnemonic, operand templates, encoded length and cost in machine cycles.
//! Both tables are built at compile time and checked there as well, so a
//! length that disagrees with the operands it declares fails the build.

pub mod alu;
pub mod cb;
pub mod helpers;
pub mod jump;
pub mod load_store;
pub mod types;

pub use cb::CB_OPCODES;
pub use types::{Argument, Condition, HlStep, Instruction, Mnemonic, Opcode, PointerRegister};

use crate::bus::MemoryBus;
use crate::cpu::registers::{Register16, Register8};
use crate::cpu::{CpuMode, CPU};
use thiserror::Error;
use tracing::{debug, warn};

/// Byte that selects the CB-prefixed table.
pub const CB_PREFIX: u8 = 0xCB;

const NONE: Argument = Argument::None;

const A: Argument = Argument::Register(Register8::A);
const B: Argument = Argument::Register(Register8::B);
const C: Argument = Argument::Register(Register8::C);
const D: Argument = Argument::Register(Register8::D);
const E: Argument = Argument::Register(Register8::E);
const H: Argument = Argument::Register(Register8::H);
const L: Argument = Argument::Register(Register8::L);

const AF: Argument = Argument::Pair(Register16::AF);
const BC: Argument = Argument::Pair(Register16::BC);
const DE: Argument = Argument::Pair(Register16::DE);
const HL: Argument = Argument::Pair(Register16::HL);
const SP: Argument = Argument::Pair(Register16::SP);

const M_BC: Argument = Argument::Pointer(PointerRegister::BC);
const M_DE: Argument = Argument::Pointer(PointerRegister::DE);
const M_HL: Argument = Argument::Pointer(PointerRegister::HL);
const HLI: Argument = Argument::HlPointer(HlStep::Increment);
const HLD: Argument = Argument::HlPointer(HlStep::Decrement);

const D8: Argument = Argument::Imm8(0);
const R8: Argument = Argument::SignedImm8(0);
const D16: Argument = Argument::Imm16(0);
const A16: Argument = Argument::Imm16Pointer(0);
const IO8: Argument = Argument::IoOffset(0);
const IOC: Argument = Argument::IoOffsetC;
const SP_R8: Argument = Argument::SpOffset(0);

const ALWAYS: Argument = Argument::Condition(Condition::Always);
const BRANCH_CONDITIONS: [Argument; 4] = [
    Argument::Condition(Condition::NotZero),
    Argument::Condition(Condition::Zero),
    Argument::Condition(Condition::NotCarry),
    Argument::Condition(Condition::Carry),
];

/// Operand order used by the 3-bit register fields of the encoding.
const OPERANDS: [Argument; 8] = [B, C, D, E, H, L, M_HL, A];
/// Register pairs addressed by the `rr` field of 16-bit loads and arithmetic.
const PAIRS: [Argument; 4] = [BC, DE, HL, SP];
/// Register pairs addressed by PUSH and POP.
const STACK_PAIRS: [Argument; 4] = [BC, DE, HL, AF];

const ALU_OPS: [Mnemonic; 8] = [
    Mnemonic::Add,
    Mnemonic::Adc,
    Mnemonic::Sub,
    Mnemonic::Sbc,
    Mnemonic::And,
    Mnemonic::Xor,
    Mnemonic::Or,
    Mnemonic::Cp,
];

const ILLEGAL: Opcode = op(Mnemonic::Illegal, NONE, NONE, 1, 1);

const fn op(mnemonic: Mnemonic, lhs: Argument, rhs: Argument, length: u8, clocks: u8) -> Opcode {
    Opcode::new(mnemonic, lhs, rhs, length, clocks)
}

/// Operand selected by a 3-bit register field; index 6 is `(hl)`.
const fn operand(index: usize) -> Argument {
    OPERANDS[index & 7]
}

/// Adds the memory access cost when the operand is `(hl)`.
const fn operand_clocks(index: usize, register: u8, memory: u8) -> u8 {
    if index & 7 == 6 {
        memory
    } else {
        register
    }
}

const fn build_base_table() -> [Opcode; 256] {
    use Mnemonic as M;

    let mut t = [ILLEGAL; 256];

    // Column-regular rows of 0x00..=0x3F.
    let mut y = 0;
    while y < 8 {
        let base = y << 3;
        t[base | 0x04] = op(M::Inc, operand(y), NONE, 1, operand_clocks(y, 1, 3));
        t[base | 0x05] = op(M::Dec, operand(y), NONE, 1, operand_clocks(y, 1, 3));
        t[base | 0x06] = op(M::Ld, operand(y), D8, 2, operand_clocks(y, 2, 3));
        y += 1;
    }
    let mut p = 0;
    while p < 4 {
        let base = p << 4;
        t[base | 0x01] = op(M::Ld, PAIRS[p], D16, 3, 3);
        t[base | 0x03] = op(M::Inc, PAIRS[p], NONE, 1, 2);
        t[base | 0x09] = op(M::Add, HL, PAIRS[p], 1, 2);
        t[base | 0x0B] = op(M::Dec, PAIRS[p], NONE, 1, 2);
        p += 1;
    }

    t[0x00] = op(M::Noop, NONE, NONE, 1, 1);
    t[0x02] = op(M::Ld, M_BC, A, 1, 2);
    t[0x07] = op(M::Rlca, NONE, NONE, 1, 1);
    t[0x08] = op(M::Ld, A16, SP, 3, 5);
    t[0x0A] = op(M::Ld, A, M_BC, 1, 2);
    t[0x0F] = op(M::Rrca, NONE, NONE, 1, 1);

    t[0x10] = op(M::Stop, NONE, NONE, 1, 1);
    t[0x12] = op(M::Ld, M_DE, A, 1, 2);
    t[0x17] = op(M::Rla, NONE, NONE, 1, 1);
    t[0x18] = op(M::Jr, ALWAYS, R8, 2, 2).with_branch(1);
    t[0x1A] = op(M::Ld, A, M_DE, 1, 2);
    t[0x1F] = op(M::Rra, NONE, NONE, 1, 1);

    t[0x22] = op(M::Ld, HLI, A, 1, 2);
    t[0x27] = op(M::Daa, NONE, NONE, 1, 1);
    t[0x2A] = op(M::Ld, A, HLI, 1, 2);
    t[0x2F] = op(M::Cpl, NONE, NONE, 1, 1);

    t[0x32] = op(M::Ld, HLD, A, 1, 2);
    t[0x37] = op(M::Scf, NONE, NONE, 1, 1);
    t[0x3A] = op(M::Ld, A, HLD, 1, 2);
    t[0x3F] = op(M::Ccf, NONE, NONE, 1, 1);

    let mut cc = 0;
    while cc < 4 {
        t[0x20 | (cc << 3)] = op(M::Jr, BRANCH_CONDITIONS[cc], R8, 2, 2).with_branch(1);
        cc += 1;
    }

    // 0x40..=0x7F: LD r, r'
    let mut i = 0x40;
    while i < 0x80 {
        let dst = (i >> 3) & 7;
        let src = i & 7;
        let clocks = if dst == 6 || src == 6 { 2 } else { 1 };
        t[i] = op(M::Ld, operand(dst), operand(src), 1, clocks);
        i += 1;
    }
    t[0x76] = op(M::Halt, NONE, NONE, 1, 1);

    // 0x80..=0xBF: ALU A, r
    while i < 0xC0 {
        let src = i & 7;
        t[i] = op(ALU_OPS[(i >> 3) & 7], A, operand(src), 1, operand_clocks(src, 1, 2));
        i += 1;
    }

    // 0xC0..=0xFF
    let mut row = 0;
    while row < 8 {
        let base = 0xC0 | (row << 3);
        t[base | 0x06] = op(ALU_OPS[row], A, D8, 2, 2);
        t[base | 0x07] = op(M::Rst, Argument::Fixed((row as u8) << 3), NONE, 1, 4);
        row += 1;
    }
    let mut cc = 0;
    while cc < 4 {
        let base = 0xC0 | (cc << 3);
        let cond = BRANCH_CONDITIONS[cc];
        t[base] = op(M::Ret, cond, NONE, 1, 2).with_branch(3);
        t[base | 0x02] = op(M::Jp, cond, D16, 3, 3).with_branch(1);
        t[base | 0x04] = op(M::Call, cond, D16, 3, 3).with_branch(3);
        cc += 1;
    }
    let mut p = 0;
    while p < 4 {
        t[0xC1 | (p << 4)] = op(M::Pop, STACK_PAIRS[p], NONE, 1, 3);
        t[0xC5 | (p << 4)] = op(M::Push, STACK_PAIRS[p], NONE, 1, 4);
        p += 1;
    }

    t[0xC3] = op(M::Jp, ALWAYS, D16, 3, 4);
    t[0xC9] = op(M::Ret, ALWAYS, NONE, 1, 4);
    t[0xCD] = op(M::Call, ALWAYS, D16, 3, 6);
    t[0xD9] = op(M::Reti, NONE, NONE, 1, 4);

    t[0xE0] = op(M::Ld, IO8, A, 2, 3);
    t[0xE2] = op(M::Ld, IOC, A, 1, 2);
    t[0xE8] = op(M::Add, SP, R8, 2, 4);
    t[0xE9] = op(M::Jp, ALWAYS, HL, 1, 1);
    t[0xEA] = op(M::Ld, A16, A, 3, 4);

    t[0xF0] = op(M::Ld, A, IO8, 2, 3);
    t[0xF2] = op(M::Ld, A, IOC, 1, 2);
    t[0xF3] = op(M::Di, NONE, NONE, 1, 1);
    t[0xF8] = op(M::Ld, HL, SP_R8, 2, 3);
    t[0xF9] = op(M::Ld, SP, HL, 1, 2);
    t[0xFA] = op(M::Ld, A, A16, 3, 4);
    t[0xFB] = op(M::Ei, NONE, NONE, 1, 1);

    // 0xCB is the prefix byte; it never reaches the executor through this table.
    t[CB_PREFIX as usize] = ILLEGAL;

    t
}

const BASE_TABLE: [Opcode; 256] = build_base_table();

/// Base (unprefixed) opcode table.
pub static OPCODES: [Opcode; 256] = BASE_TABLE;

/// Whether an entry's declared length matches the operands it carries.
pub(crate) const fn entry_is_consistent(entry: &Opcode, prefixed: bool) -> bool {
    let lhs = entry.lhs.payload_size();
    let rhs = entry.rhs.payload_size();
    if prefixed {
        entry.length == 2 && lhs == 0 && rhs == 0
    } else {
        (lhs == 0 || rhs == 0) && entry.length == 1 + lhs + rhs
    }
}

pub(crate) const fn first_inconsistent(table: &[Opcode; 256], prefixed: bool) -> Option<usize> {
    let mut i = 0;
    while i < 256 {
        if !entry_is_consistent(&table[i], prefixed) {
            return Some(i);
        }
        i += 1;
    }
    None
}

const _: () = assert!(first_inconsistent(&BASE_TABLE, false).is_none());

/// An opcode table entry whose length disagrees with its operands.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    #[error("opcode {opcode:#04X} declares length {declared}, operands need {expected}")]
    Base { opcode: u8, declared: u8, expected: u8 },
    #[error("opcode CB {opcode:#04X} declares length {declared}, expected 2 with no immediate")]
    Prefixed { opcode: u8, declared: u8 },
}

/// Re-checks both tables at runtime.
pub fn check_tables() -> Result<(), TableError> {
    if let Some(index) = first_inconsistent(&OPCODES, false) {
        let entry = OPCODES[index];
        return Err(TableError::Base {
            opcode: index as u8,
            declared: entry.length,
            expected: 1 + entry.payload_size(),
        });
    }
    if let Some(index) = first_inconsistent(&CB_OPCODES, true) {
        return Err(TableError::Prefixed {
            opcode: index as u8,
            declared: CB_OPCODES[index].length,
        });
    }
    Ok(())
}

impl CPU {
    /// Applies one decoded instruction. PC must already point past it.
    ///
    /// Returns whether a control transfer was taken, which selects the
    /// instruction's branch cost.
    pub(crate) fn execute(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) -> bool {
        match instr.mnemonic {
            Mnemonic::Noop => {}
            Mnemonic::Ld => self.exec_ld(instr, bus),
            Mnemonic::Push => self.exec_push(instr, bus),
            Mnemonic::Pop => self.exec_pop(instr, bus),
            Mnemonic::Inc | Mnemonic::Dec => self.exec_inc_dec(instr, bus),
            Mnemonic::Add => self.exec_add(instr, bus),
            Mnemonic::Adc
            | Mnemonic::Sub
            | Mnemonic::Sbc
            | Mnemonic::And
            | Mnemonic::Xor
            | Mnemonic::Or
            | Mnemonic::Cp => {
                let value = self.read8(bus, instr.rhs);
                self.alu_a(instr.mnemonic, value);
            }
            Mnemonic::Daa => self.exec_daa(),
            Mnemonic::Cpl => self.exec_cpl(),
            Mnemonic::Scf => self.exec_scf(),
            Mnemonic::Ccf => self.exec_ccf(),
            Mnemonic::Rlca | Mnemonic::Rrca | Mnemonic::Rla | Mnemonic::Rra => {
                self.exec_rotate_a(instr.mnemonic);
            }
            Mnemonic::Rlc
            | Mnemonic::Rrc
            | Mnemonic::Rl
            | Mnemonic::Rr
            | Mnemonic::Sla
            | Mnemonic::Sra
            | Mnemonic::Swap
            | Mnemonic::Srl => self.exec_shift(instr, bus),
            Mnemonic::Bit => self.exec_bit(instr, bus),
            Mnemonic::Res | Mnemonic::Set => self.exec_res_set(instr, bus),
            Mnemonic::Jr => return self.exec_jr(instr),
            Mnemonic::Jp => return self.exec_jp(instr),
            Mnemonic::Call => return self.exec_call(instr, bus),
            Mnemonic::Ret => return self.exec_ret(instr, bus),
            Mnemonic::Reti => self.exec_reti(bus),
            Mnemonic::Rst => self.exec_rst(instr, bus),
            Mnemonic::Di => {
                self.ime = false;
                self.ime_scheduled = false;
            }
            Mnemonic::Ei => self.ime_scheduled = true,
            Mnemonic::Halt => {
                debug!(pc = self.regs.pc, "halted");
                self.mode = CpuMode::Halted;
            }
            Mnemonic::Stop => {
                debug!(pc = self.regs.pc, "stopped");
                self.mode = CpuMode::Stopped;
            }
            Mnemonic::Illegal => {
                warn!(
                    pc = self.regs.pc.wrapping_sub(u16::from(instr.length)),
                    "illegal opcode executed as no-op"
                );
            }
        }
        false
    }
}
