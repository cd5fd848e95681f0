/// core-lib/src/mmu/mod.rs
use crate::bus::MemoryBus;
use crate::cartridge::Cartridge;
use crate::interrupts::{InterruptFlag, Interrupts};
use thiserror::Error;
use tracing::{debug, trace};

pub const BOOT_ROM_SIZE: usize = 0x100;

/// Writing a nonzero value here unmaps the boot ROM until reset.
pub const BOOT_ROM_DISABLE: u16 = 0xFF50;
pub const IF_ADDR: u16 = 0xFF0F;
pub const IE_ADDR: u16 = 0xFFFF;

/// Value read from addresses with nothing behind them.
pub const OPEN_BUS: u8 = 0xFF;

/// Minimal warm-up program used when no real boot ROM is supplied.
///
/// A NOP slide followed by `LD SP, 0xFFFE`, `LD A, 0x01` and
/// `LDH (0x50), A`, placed so that the final write unmaps the boot ROM
/// with PC landing on the cartridge entry point at 0x0100.
pub const DEFAULT_BOOT_ROM: [u8; BOOT_ROM_SIZE] = build_default_boot_rom();

const fn build_default_boot_rom() -> [u8; BOOT_ROM_SIZE] {
    const TAIL: [u8; 7] = [0x31, 0xFE, 0xFF, 0x3E, 0x01, 0xE0, 0x50];
    let mut rom = [0x00; BOOT_ROM_SIZE];
    let start = BOOT_ROM_SIZE - TAIL.len();
    let mut i = 0;
    while i < TAIL.len() {
        rom[start + i] = TAIL[i];
        i += 1;
    }
    rom
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MmuError {
    #[error("Boot ROM must be exactly 256 bytes, got {0}")]
    InvalidBootRomSize(usize),
}

/// Owner of every byte in the address space.
///
/// | range       | backing                                       |
/// |-------------|-----------------------------------------------|
/// | 0000-00FF   | boot ROM while mapped, else cartridge         |
/// | 0000-7FFF   | cartridge ROM (0xFF past the image or absent) |
/// | 8000-9FFF   | VRAM                                          |
/// | A000-BFFF   | external RAM                                  |
/// | C000-DFFF   | work RAM                                      |
/// | E000-FDFF   | echo of C000-DDFF                             |
/// | FE00-FE9F   | OAM                                           |
/// | FEA0-FEFF   | unusable, reads 0xFF                          |
/// | FF00-FF7F   | I/O registers                                 |
/// | FF80-FFFE   | high RAM                                      |
/// | FFFF        | IE                                            |
#[derive(Debug, Clone)]
pub struct MMU {
    boot_rom: [u8; BOOT_ROM_SIZE],
    boot_rom_active: bool,
    cartridge: Option<Cartridge>,
    vram: [u8; 0x2000],
    eram: [u8; 0x2000],
    wram: [u8; 0x2000],
    oam: [u8; 0xA0],
    io_registers: [u8; 0x80],
    hram: [u8; 0x7F],
    pub interrupts: Interrupts,
}

impl MMU {
    /// Bus with no boot ROM mapped; execution is expected to start at 0x0100.
    pub fn new(cartridge: Option<Cartridge>) -> Self {
        Self {
            boot_rom: [0; BOOT_ROM_SIZE],
            boot_rom_active: false,
            cartridge,
            vram: [0; 0x2000],
            eram: [0; 0x2000],
            wram: [0; 0x2000],
            oam: [0; 0xA0],
            io_registers: [0; 0x80],
            hram: [0; 0x7F],
            interrupts: Interrupts::new(),
        }
    }

    /// Bus with `boot_rom` overlaying 0x0000..=0x00FF.
    pub fn with_boot_rom(boot_rom: &[u8], cartridge: Option<Cartridge>) -> Result<Self, MmuError> {
        let boot_rom: [u8; BOOT_ROM_SIZE] = boot_rom
            .try_into()
            .map_err(|_| MmuError::InvalidBootRomSize(boot_rom.len()))?;
        Ok(Self {
            boot_rom,
            boot_rom_active: true,
            ..Self::new(cartridge)
        })
    }

    pub const fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn request_interrupt(&mut self, flag: InterruptFlag) {
        self.interrupts.request(flag);
    }
}

impl MemoryBus for MMU {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x00FF if self.boot_rom_active => self.boot_rom[usize::from(addr)],
            0x0000..=0x7FFF => self.cartridge.as_ref().map_or(OPEN_BUS, |c| c.read(addr)),
            0x8000..=0x9FFF => self.vram[usize::from(addr - 0x8000)],
            0xA000..=0xBFFF => self.eram[usize::from(addr - 0xA000)],
            0xC000..=0xDFFF => self.wram[usize::from(addr - 0xC000)],
            0xE000..=0xFDFF => self.wram[usize::from(addr - 0xE000)],
            0xFE00..=0xFE9F => self.oam[usize::from(addr - 0xFE00)],
            0xFEA0..=0xFEFF => OPEN_BUS,
            IF_ADDR => self.interrupts.read_if(),
            0xFF00..=0xFF7F => self.io_registers[usize::from(addr - 0xFF00)],
            0xFF80..=0xFFFE => self.hram[usize::from(addr - 0xFF80)],
            IE_ADDR => self.interrupts.read_ie(),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => trace!(addr, value, "write to ROM ignored"),
            0x8000..=0x9FFF => self.vram[usize::from(addr - 0x8000)] = value,
            0xA000..=0xBFFF => self.eram[usize::from(addr - 0xA000)] = value,
            0xC000..=0xDFFF => self.wram[usize::from(addr - 0xC000)] = value,
            0xE000..=0xFDFF => self.wram[usize::from(addr - 0xE000)] = value,
            0xFE00..=0xFE9F => self.oam[usize::from(addr - 0xFE00)] = value,
            0xFEA0..=0xFEFF => trace!(addr, value, "write to unusable region ignored"),
            IF_ADDR => self.interrupts.write_if(value),
            BOOT_ROM_DISABLE => {
                self.io_registers[usize::from(addr - 0xFF00)] = value;
                if value != 0 && self.boot_rom_active {
                    debug!("boot ROM unmapped");
                    self.boot_rom_active = false;
                }
            }
            0xFF00..=0xFF7F => self.io_registers[usize::from(addr - 0xFF00)] = value,
            0xFF80..=0xFFFE => self.hram[usize::from(addr - 0xFF80)] = value,
            IE_ADDR => self.interrupts.write_ie(value),
        }
    }

    fn boot_rom_active(&self) -> bool {
        self.boot_rom_active
    }

    fn get_interrupt(&self) -> Option<InterruptFlag> {
        self.interrupts.get_interrupt()
    }

    fn clear_interrupt(&mut self, flag: InterruptFlag) {
        self.interrupts.clear(flag);
    }
}
