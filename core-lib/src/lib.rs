pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod disasm;
pub mod gameboy;
pub mod interrupts;
pub mod mmu;
pub mod ppu;

// Re-export common types
pub use bus::MemoryBus;
pub use cartridge::{Cartridge, CartridgeError};
pub use cpu::{decode_one, CpuMode, Instruction, CPU};
pub use disasm::{disassemble, format_instruction};
pub use gameboy::{GameBoy, GameBoyError};
pub use interrupts::{InterruptFlag, Interrupts};
pub use mmu::{MmuError, MMU};
pub use ppu::Ppu;
