/// core-lib/src/cpu/mod.rs
pub mod decoder;
pub mod opcodes;
pub mod registers;
pub mod resolve;

pub use decoder::{decode_one, decode_with, Decoder};
pub use opcodes::{check_tables, Argument, Instruction, Mnemonic, CB_OPCODES, OPCODES};
pub use registers::{Flags, Register16, Register8, RegisterPair, Registers};

use crate::bus::MemoryBus;
use crate::interrupts::InterruptFlag;
use tracing::{debug, instrument, trace};

/// Cycles spent dispatching an interrupt to its vector.
const INTERRUPT_DISPATCH_CYCLES: u32 = 5;

/// Execution mode of the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuMode {
    /// Executing with the boot ROM mapped over 0x0000..=0x00FF.
    #[default]
    Booting,
    /// Executing with the boot ROM unmapped.
    Running,
    /// Clock-gated by HALT until an enabled interrupt is pending.
    Halted,
    /// Clock-gated by STOP; wakes like `Halted`.
    Stopped,
}

impl CpuMode {
    pub const fn is_sleeping(self) -> bool {
        matches!(self, Self::Halted | Self::Stopped)
    }
}

/// The LR35902 execution engine. Cycle counts are in machine cycles.
#[derive(Debug, Clone)]
pub struct CPU {
    pub regs: Registers,
    pub mode: CpuMode,
    /// Interrupt master enable.
    pub ime: bool,
    /// Set by EI; IME turns on after the next instruction completes.
    ime_scheduled: bool,
    cycles: u64,
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}

impl CPU {
    /// Power-on state: PC at the start of the boot ROM.
    pub fn new() -> Self {
        let mut regs = Registers::new();
        regs.sp = 0xFFFE;
        Self {
            regs,
            mode: CpuMode::Booting,
            ime: false,
            ime_scheduled: false,
            cycles: 0,
        }
    }

    /// State after the boot ROM has handed over to the cartridge.
    pub const fn post_boot() -> Self {
        Self {
            regs: Registers::post_boot(),
            mode: CpuMode::Running,
            ime: false,
            ime_scheduled: false,
            cycles: 0,
        }
    }

    /// Total machine cycles consumed since construction.
    pub const fn get_cycles(&self) -> u64 {
        self.cycles
    }

    pub const fn ime_pending(&self) -> bool {
        self.ime_scheduled
    }

    /// Leaves HALT or STOP.
    pub fn resume(&mut self, bus: &dyn MemoryBus) {
        self.mode = if bus.boot_rom_active() {
            CpuMode::Booting
        } else {
            CpuMode::Running
        };
    }

    /// Executes one instruction, services one interrupt or idles one cycle
    /// while halted. Returns the machine cycles consumed.
    #[instrument(skip(self, bus), level = "trace")]
    pub fn step(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        let cycles = self.step_inner(bus);
        self.cycles += u64::from(cycles);
        cycles
    }

    fn step_inner(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        if let Some(flag) = bus.get_interrupt() {
            if self.mode.is_sleeping() {
                debug!(?flag, "woken by interrupt");
                self.resume(bus);
            }
            if self.ime {
                return self.service_interrupt(bus, flag);
            }
        }
        if self.mode.is_sleeping() {
            return 1;
        }

        let pc = self.regs.pc;
        let instr = decode_with(|offset| bus.read(pc.wrapping_add(offset)));
        self.regs.pc = pc.wrapping_add(u16::from(instr.length));
        trace!("{pc:#06X}  {instr}");

        let enable_ime = std::mem::take(&mut self.ime_scheduled);
        let taken = self.execute(&instr, bus);
        if enable_ime && instr.mnemonic != Mnemonic::Di {
            self.ime = true;
        }

        if self.mode == CpuMode::Booting && !bus.boot_rom_active() {
            debug!(pc = self.regs.pc, "boot ROM unmapped, running cartridge");
            self.mode = CpuMode::Running;
        }

        instr.cycles(taken)
    }

    fn service_interrupt(&mut self, bus: &mut dyn MemoryBus, flag: InterruptFlag) -> u32 {
        debug!(?flag, pc = self.regs.pc, "servicing interrupt");
        self.ime = false;
        self.ime_scheduled = false;
        bus.clear_interrupt(flag);
        let ret = self.regs.pc;
        self.push_word(bus, ret);
        self.regs.pc = flag.vector();
        INTERRUPT_DISPATCH_CYCLES
    }
}

#[cfg(test)]
mod tests;
