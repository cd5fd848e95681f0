//! 8-bit and 16-bit arithmetic.
//!
//! The pure helpers return the result together with the complete new flag
//! set; callers decide which flags survive (INC/DEC keep carry, ADD HL keeps
//! zero).

use super::types::{Argument, Instruction, Mnemonic};
use crate::bus::MemoryBus;
use crate::cpu::registers::{Flags, Register16};
use crate::cpu::CPU;

#[allow(clippy::fn_params_excessive_bools)]
fn flags(zero: bool, subtract: bool, half_carry: bool, carry: bool) -> Flags {
    let mut flags = Flags::empty();
    flags.set(Flags::ZERO, zero);
    flags.set(Flags::SUBTRACT, subtract);
    flags.set(Flags::HALF_CARRY, half_carry);
    flags.set(Flags::CARRY, carry);
    flags
}

/// ADD / ADC
pub fn add8(a: u8, b: u8, carry_in: bool) -> (u8, Flags) {
    let c = u8::from(carry_in);
    let result = a.wrapping_add(b).wrapping_add(c);
    let half_carry = (a & 0x0F) + (b & 0x0F) + c > 0x0F;
    let carry = u16::from(a) + u16::from(b) + u16::from(c) > 0xFF;
    (result, flags(result == 0, false, half_carry, carry))
}

/// SUB / SBC / CP
pub fn sub8(a: u8, b: u8, carry_in: bool) -> (u8, Flags) {
    let c = u8::from(carry_in);
    let result = a.wrapping_sub(b).wrapping_sub(c);
    let half_carry = (a & 0x0F) < (b & 0x0F) + c;
    let carry = u16::from(a) < u16::from(b) + u16::from(c);
    (result, flags(result == 0, true, half_carry, carry))
}

pub fn inc8(value: u8, carry: bool) -> (u8, Flags) {
    let result = value.wrapping_add(1);
    (result, flags(result == 0, false, value & 0x0F == 0x0F, carry))
}

pub fn dec8(value: u8, carry: bool) -> (u8, Flags) {
    let result = value.wrapping_sub(1);
    (result, flags(result == 0, true, value & 0x0F == 0, carry))
}

/// ADD HL, rr: half-carry out of bit 11, carry out of bit 15, Z untouched.
pub fn add16(hl: u16, value: u16, zero: bool) -> (u16, Flags) {
    let (result, carry) = hl.overflowing_add(value);
    let half_carry = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
    (result, flags(zero, false, half_carry, carry))
}

/// SP + e8 as used by `ADD SP, e8` and `LD HL, SP+e8`.
///
/// Both carries are computed on the low byte with the offset taken unsigned;
/// Z and N are always cleared.
pub fn add_sp(sp: u16, offset: i8) -> (u16, Flags) {
    let unsigned = u16::from(offset as u8);
    let half_carry = (sp & 0x000F) + (unsigned & 0x000F) > 0x000F;
    let carry = (sp & 0x00FF) + unsigned > 0x00FF;
    (sp.wrapping_add_signed(i16::from(offset)), flags(false, false, half_carry, carry))
}

/// Decimal adjust after an addition or subtraction.
pub fn daa(a: u8, current: Flags) -> (u8, Flags) {
    let subtract = current.contains(Flags::SUBTRACT);
    let mut correction = 0;
    let mut carry = false;
    if current.contains(Flags::HALF_CARRY) || (!subtract && a & 0x0F > 0x09) {
        correction |= 0x06;
    }
    if current.contains(Flags::CARRY) || (!subtract && a > 0x99) {
        correction |= 0x60;
        carry = true;
    }
    let result = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    (result, flags(result == 0, subtract, false, carry))
}

impl CPU {
    /// A <- A op value for the eight accumulator operations. CP discards the result.
    pub(super) fn alu_a(&mut self, mnemonic: Mnemonic, value: u8) {
        let a = self.regs.a();
        let carry = self.regs.flag(Flags::CARRY);
        let (result, new_flags) = match mnemonic {
            Mnemonic::Add => add8(a, value, false),
            Mnemonic::Adc => add8(a, value, carry),
            Mnemonic::Sub | Mnemonic::Cp => sub8(a, value, false),
            Mnemonic::Sbc => sub8(a, value, carry),
            Mnemonic::And => {
                let r = a & value;
                (r, flags(r == 0, false, true, false))
            }
            Mnemonic::Xor => {
                let r = a ^ value;
                (r, flags(r == 0, false, false, false))
            }
            Mnemonic::Or => {
                let r = a | value;
                (r, flags(r == 0, false, false, false))
            }
            _ => return,
        };
        if mnemonic != Mnemonic::Cp {
            self.regs.set_a(result);
        }
        self.regs.set_flags(new_flags);
    }

    pub(super) fn exec_add(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        match (instr.lhs, instr.rhs) {
            (Argument::Pair(Register16::HL), Argument::Pair(src)) => {
                let zero = self.regs.flag(Flags::ZERO);
                let (result, new_flags) = add16(self.regs.hl(), self.regs.get16(src), zero);
                self.regs.set_hl(result);
                self.regs.set_flags(new_flags);
            }
            (Argument::Pair(Register16::SP), Argument::SignedImm8(offset)) => {
                let (result, new_flags) = add_sp(self.regs.sp, offset);
                self.regs.sp = result;
                self.regs.set_flags(new_flags);
            }
            (_, src) => {
                let value = self.read8(bus, src);
                self.alu_a(Mnemonic::Add, value);
            }
        }
    }

    /// INC/DEC on an 8-bit operand (flags) or a register pair (no flags).
    pub(super) fn exec_inc_dec(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        let increment = instr.mnemonic == Mnemonic::Inc;
        if let Argument::Pair(pair) = instr.lhs {
            let value = self.regs.get16(pair);
            let result = if increment {
                value.wrapping_add(1)
            } else {
                value.wrapping_sub(1)
            };
            self.regs.set16(pair, result);
            return;
        }
        let value = self.read8(bus, instr.lhs);
        let carry = self.regs.flag(Flags::CARRY);
        let (result, new_flags) = if increment {
            inc8(value, carry)
        } else {
            dec8(value, carry)
        };
        self.write8(bus, instr.lhs, result);
        self.regs.set_flags(new_flags);
    }

    pub(super) fn exec_daa(&mut self) {
        let (result, new_flags) = daa(self.regs.a(), self.regs.flags());
        self.regs.set_a(result);
        self.regs.set_flags(new_flags);
    }

    pub(super) fn exec_cpl(&mut self) {
        self.regs.set_a(!self.regs.a());
        let mut f = self.regs.flags();
        f.insert(Flags::SUBTRACT | Flags::HALF_CARRY);
        self.regs.set_flags(f);
    }

    pub(super) fn exec_scf(&mut self) {
        let zero = self.regs.flag(Flags::ZERO);
        self.regs.set_flags(flags(zero, false, false, true));
    }

    pub(super) fn exec_ccf(&mut self) {
        let f = self.regs.flags();
        self.regs.set_flags(flags(
            f.contains(Flags::ZERO),
            false,
            false,
            !f.contains(Flags::CARRY),
        ));
    }
}
