//! CB-prefixed opcodes: rotates, shifts, SWAP and the BIT/RES/SET family.
//!
//! The CB space is fully regular, so the table is generated from the opcode
//! fields `xx yyy zzz`: `xx` picks the group, `yyy` the operation or bit
//! index and `zzz` the operand.

use super::types::{Argument, Instruction, Mnemonic, Opcode};
use super::{first_inconsistent, operand, operand_clocks, NONE};
use crate::bus::MemoryBus;
use crate::cpu::registers::Flags;
use crate::cpu::CPU;

const SHIFT_OPS: [Mnemonic; 8] = [
    Mnemonic::Rlc,
    Mnemonic::Rrc,
    Mnemonic::Rl,
    Mnemonic::Rr,
    Mnemonic::Sla,
    Mnemonic::Sra,
    Mnemonic::Swap,
    Mnemonic::Srl,
];

const fn build_cb_table() -> [Opcode; 256] {
    let mut t = [Opcode::new(Mnemonic::Illegal, NONE, NONE, 2, 2); 256];
    let mut i = 0;
    while i < 256 {
        let y = (i >> 3) & 7;
        let z = i & 7;
        t[i] = match i >> 6 {
            0 => Opcode::new(SHIFT_OPS[y], operand(z), NONE, 2, operand_clocks(z, 2, 4)),
            1 => Opcode::new(
                Mnemonic::Bit,
                Argument::Fixed(y as u8),
                operand(z),
                2,
                operand_clocks(z, 2, 3),
            ),
            2 => Opcode::new(
                Mnemonic::Res,
                Argument::Fixed(y as u8),
                operand(z),
                2,
                operand_clocks(z, 2, 4),
            ),
            _ => Opcode::new(
                Mnemonic::Set,
                Argument::Fixed(y as u8),
                operand(z),
                2,
                operand_clocks(z, 2, 4),
            ),
        };
        i += 1;
    }
    t
}

const PREFIXED_TABLE: [Opcode; 256] = build_cb_table();

/// CB-prefixed opcode table, indexed by the byte after 0xCB.
pub static CB_OPCODES: [Opcode; 256] = PREFIXED_TABLE;

const _: () = assert!(first_inconsistent(&PREFIXED_TABLE, true).is_none());

/// Rotate or shift `value`, returning the result and the bit shifted out.
///
/// The accumulator forms (RLCA, RRCA, RLA, RRA) share the arithmetic of
/// their CB counterparts.
pub const fn shift(mnemonic: Mnemonic, value: u8, carry_in: bool) -> (u8, bool) {
    let carry_bit = carry_in as u8;
    match mnemonic {
        Mnemonic::Rlc | Mnemonic::Rlca => (value.rotate_left(1), value & 0x80 != 0),
        Mnemonic::Rrc | Mnemonic::Rrca => (value.rotate_right(1), value & 0x01 != 0),
        Mnemonic::Rl | Mnemonic::Rla => ((value << 1) | carry_bit, value & 0x80 != 0),
        Mnemonic::Rr | Mnemonic::Rra => ((value >> 1) | (carry_bit << 7), value & 0x01 != 0),
        Mnemonic::Sla => (value << 1, value & 0x80 != 0),
        Mnemonic::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
        Mnemonic::Srl => (value >> 1, value & 0x01 != 0),
        Mnemonic::Swap => (value.rotate_left(4), false),
        _ => (value, carry_in),
    }
}

const fn bit_index(arg: Argument) -> u8 {
    match arg {
        Argument::Fixed(bit) => bit & 7,
        _ => 0,
    }
}

impl CPU {
    /// RLCA, RRCA, RLA, RRA: Z is always cleared.
    pub(super) fn exec_rotate_a(&mut self, mnemonic: Mnemonic) {
        let (result, carry) = shift(mnemonic, self.regs.a(), self.regs.flag(Flags::CARRY));
        self.regs.set_a(result);
        self.regs.set_flags(if carry { Flags::CARRY } else { Flags::empty() });
    }

    pub(super) fn exec_shift(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        let value = self.read8(bus, instr.lhs);
        let (result, carry) = shift(instr.mnemonic, value, self.regs.flag(Flags::CARRY));
        self.write8(bus, instr.lhs, result);
        let mut flags = Flags::empty();
        flags.set(Flags::ZERO, result == 0);
        flags.set(Flags::CARRY, carry);
        self.regs.set_flags(flags);
    }

    pub(super) fn exec_bit(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        let value = self.read8(bus, instr.rhs);
        let bit = bit_index(instr.lhs);
        let mut flags = self.regs.flags() & Flags::CARRY;
        flags.insert(Flags::HALF_CARRY);
        flags.set(Flags::ZERO, value & (1 << bit) == 0);
        self.regs.set_flags(flags);
    }

    pub(super) fn exec_res_set(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        let value = self.read8(bus, instr.rhs);
        let mask = 1 << bit_index(instr.lhs);
        let result = if instr.mnemonic == Mnemonic::Set {
            value | mask
        } else {
            value & !mask
        };
        self.write8(bus, instr.rhs, result);
    }
}
