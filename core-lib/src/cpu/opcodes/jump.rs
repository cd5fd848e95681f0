//! Relative and absolute jumps, calls, returns and restarts.
//!
//! Every handler returns whether the transfer was taken so the caller can
//! charge the instruction's branch cost.

use super::types::{Argument, Instruction};
use crate::bus::MemoryBus;
use crate::cpu::resolve::resolve_condition;
use crate::cpu::CPU;

impl CPU {
    pub(super) fn exec_jr(&mut self, instr: &Instruction) -> bool {
        if !resolve_condition(&self.regs, instr.lhs) {
            return false;
        }
        if let Argument::SignedImm8(offset) = instr.rhs {
            self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
        }
        true
    }

    pub(super) fn exec_jp(&mut self, instr: &Instruction) -> bool {
        if !resolve_condition(&self.regs, instr.lhs) {
            return false;
        }
        match instr.rhs {
            Argument::Imm16(target) => self.regs.pc = target,
            Argument::Pair(pair) => self.regs.pc = self.regs.get16(pair),
            _ => {}
        }
        true
    }

    pub(super) fn exec_call(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) -> bool {
        if !resolve_condition(&self.regs, instr.lhs) {
            return false;
        }
        if let Argument::Imm16(target) = instr.rhs {
            let ret = self.regs.pc;
            self.push_word(bus, ret);
            self.regs.pc = target;
        }
        true
    }

    pub(super) fn exec_ret(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) -> bool {
        if !resolve_condition(&self.regs, instr.lhs) {
            return false;
        }
        self.regs.pc = self.pop_word(bus);
        true
    }

    /// RETI re-enables interrupts without the EI delay.
    pub(super) fn exec_reti(&mut self, bus: &mut dyn MemoryBus) {
        self.regs.pc = self.pop_word(bus);
        self.ime = true;
    }

    pub(super) fn exec_rst(&mut self, instr: &Instruction, bus: &mut dyn MemoryBus) {
        if let Argument::Fixed(vector) = instr.lhs {
            let ret = self.regs.pc;
            self.push_word(bus, ret);
            self.regs.pc = u16::from(vector);
        }
    }
}
