//! LD in all its addressing forms, plus PUSH and POP.

use super::alu::add_sp;
use super::types::{Argument, Instruction};
use crate::bus::MemoryBus;
use crate::cpu::CPU;

impl CPU {
    pub(super) fn exec_ld(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        match (instr.lhs, instr.rhs) {
            // LD rr, d16
            (Argument::Pair(dst), Argument::Imm16(value)) => self.regs.set16(dst, value),
            // LD (a16), SP
            (Argument::Imm16Pointer(addr), Argument::Pair(src)) => {
                bus.write_word(addr, self.regs.get16(src));
            }
            // LD HL, SP+e8
            (Argument::Pair(dst), Argument::SpOffset(offset)) => {
                let (value, flags) = add_sp(self.regs.sp, offset);
                self.regs.set16(dst, value);
                self.regs.set_flags(flags);
            }
            // LD SP, HL
            (Argument::Pair(dst), Argument::Pair(src)) => {
                let value = self.regs.get16(src);
                self.regs.set16(dst, value);
            }
            (dst, src) => {
                let value = self.read8(bus, src);
                self.write8(bus, dst, value);
            }
        }
    }

    pub(super) fn exec_push(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        if let Argument::Pair(pair) = instr.lhs {
            let value = self.regs.get16(pair);
            self.push_word(bus, value);
        }
    }

    /// POP AF drops the low nibble of F through `set_af`.
    pub(super) fn exec_pop(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        if let Argument::Pair(pair) = instr.lhs {
            let value = self.pop_word(bus);
            self.regs.set16(pair, value);
        }
    }
}
