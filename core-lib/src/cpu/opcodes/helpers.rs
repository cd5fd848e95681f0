//! Operand access and stack helpers shared by the opcode handlers.

use super::types::{Argument, HlStep};
use crate::bus::MemoryBus;
use crate::cpu::resolve::resolve_payload;
use crate::cpu::CPU;
use tracing::warn;

impl CPU {
    /// Memory address named by an operand. `(hl+)` and `(hl-)` step HL
    /// after yielding the address.
    fn take_address(&mut self, arg: Argument) -> Option<u16> {
        match arg {
            Argument::HlPointer(step) => {
                let hl = self.regs.hl();
                let next = match step {
                    HlStep::Increment => hl.wrapping_add(1),
                    HlStep::Decrement => hl.wrapping_sub(1),
                };
                self.regs.set_hl(next);
                Some(hl)
            }
            Argument::Pointer(_)
            | Argument::IoOffset(_)
            | Argument::IoOffsetC
            | Argument::Imm16Pointer(_) => resolve_payload(&self.regs, arg),
            _ => None,
        }
    }

    /// Reads an 8-bit operand. Kinds with no 8-bit value read as 0xFF.
    pub(crate) fn read8(&mut self, bus: &mut dyn MemoryBus, arg: Argument) -> u8 {
        match arg {
            Argument::Register(reg) => self.regs.get8(reg),
            Argument::Imm8(value) => value,
            _ => match self.take_address(arg) {
                Some(addr) => bus.read(addr),
                None => {
                    warn!(?arg, "operand has no 8-bit value");
                    0xFF
                }
            },
        }
    }

    pub(crate) fn write8(&mut self, bus: &mut dyn MemoryBus, arg: Argument, value: u8) {
        if let Argument::Register(reg) = arg {
            self.regs.set8(reg, value);
            return;
        }
        match self.take_address(arg) {
            Some(addr) => bus.write(addr, value),
            None => warn!(?arg, "operand is not writable"),
        }
    }

    /// SP is decremented before each byte is written, high byte first.
    pub(crate) fn push_word(&mut self, bus: &mut dyn MemoryBus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    pub(crate) fn pop_word(&mut self, bus: &mut dyn MemoryBus) -> u16 {
        let lo = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }
}
