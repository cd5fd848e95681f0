//! Turns operand descriptors into concrete values using the register file.
//!
//! Nothing here mutates CPU state; post-increment of `(hl+)` and memory
//! reads happen in the executor.

use crate::cpu::opcodes::{Argument, Condition};
use crate::cpu::registers::{Flags, Registers};

/// Concrete 16-bit payload of an operand.
///
/// - I/O offsets resolve to `0xFF00 + n` (or `+ C`).
/// - `sp+e` resolves to SP plus the sign-extended offset.
/// - Pointers resolve to the address they name; registers to their value.
/// - Signed immediates are sign-extended.
///
/// `None` and conditions carry no payload and resolve to `None`.
pub fn resolve_payload(regs: &Registers, arg: Argument) -> Option<u16> {
    match arg {
        Argument::IoOffset(offset) => Some(0xFF00 | u16::from(offset)),
        Argument::IoOffsetC => Some(0xFF00 | u16::from(regs.c())),
        Argument::SpOffset(offset) => Some(regs.sp.wrapping_add_signed(i16::from(offset))),
        Argument::Imm8(value) | Argument::Fixed(value) => Some(u16::from(value)),
        Argument::SignedImm8(value) => Some(i16::from(value) as u16),
        Argument::Imm16(value) | Argument::Imm16Pointer(value) => Some(value),
        Argument::Register(reg) => Some(u16::from(regs.get8(reg))),
        Argument::Pair(pair) => Some(regs.get16(pair)),
        Argument::Pointer(ptr) => Some(regs.get16(ptr.pair())),
        Argument::HlPointer(_) => Some(regs.hl()),
        Argument::None | Argument::Condition(_) => None,
    }
}

/// Whether a control transfer guarded by `arg` is taken.
///
/// Conditions keep the table's inverted naming: `z` branches when Z is
/// clear and `nz` when Z is set; `c` branches when C is clear and `nc` when
/// C is set. Unconditional forms and non-condition operands always branch.
pub fn resolve_condition(regs: &Registers, arg: Argument) -> bool {
    let flags = regs.flags();
    match arg {
        Argument::Condition(Condition::Zero) => !flags.contains(Flags::ZERO),
        Argument::Condition(Condition::NotZero) => flags.contains(Flags::ZERO),
        Argument::Condition(Condition::Carry) => !flags.contains(Flags::CARRY),
        Argument::Condition(Condition::NotCarry) => flags.contains(Flags::CARRY),
        _ => true,
    }
}
