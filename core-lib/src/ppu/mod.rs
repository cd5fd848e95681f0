//! Timing-only video unit.
//!
//! Walks the mode state machine and keeps LY and STAT current; pixels are
//! not produced. It owns no memory: every register is reached through a bus
//! address.
use crate::bus::MemoryBus;
use crate::interrupts::InterruptMask;
use crate::mmu::IF_ADDR;
use bitflags::bitflags;
use tracing::trace;

bitflags! {
    /// The one LCDC bit timing depends on.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LcdControl: u8 {
        const LCD_ENABLE = 1 << 7;
    }
}

bitflags! {
    /// STAT interrupt selects, the coincidence flag and the mode field.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LcdStatus: u8 {
        const LYC_INTERRUPT = 1 << 6;
        const OAM_INTERRUPT = 1 << 5;
        const VBLANK_INTERRUPT = 1 << 4;
        const HBLANK_INTERRUPT = 1 << 3;
        const LYC_EQUAL_LY = 1 << 2;
        const MODE_FLAG_MASK = 0b11;
    }
}

pub const LCDC_ADDR: u16 = 0xFF40;
pub const STAT_ADDR: u16 = 0xFF41;
pub const LY_ADDR: u16 = 0xFF44;
pub const LYC_ADDR: u16 = 0xFF45;

pub const DOTS_PER_LINE: u32 = 456;
pub const DOTS_PER_CYCLE: u32 = 4;
pub const VISIBLE_LINES: u8 = 144;
pub const LINES_PER_FRAME: u8 = 154;

/// PPU Modes as defined in STAT register bits 0-1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PpuMode {
    #[default]
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    PixelTransfer = 3,
}

impl PpuMode {
    /// Mode in effect `dot` dots into a line.
    pub const fn at(line: u8, dot: u32) -> Self {
        if line >= VISIBLE_LINES {
            Self::VBlank
        } else if dot < 80 {
            Self::OamSearch
        } else if dot < 80 + 172 {
            Self::PixelTransfer
        } else {
            Self::HBlank
        }
    }

    /// STAT enable bit that raises an LCD interrupt on entering this mode.
    const fn stat_source(self) -> LcdStatus {
        match self {
            Self::HBlank => LcdStatus::HBLANK_INTERRUPT,
            Self::VBlank => LcdStatus::VBLANK_INTERRUPT,
            Self::OamSearch => LcdStatus::OAM_INTERRUPT,
            Self::PixelTransfer => LcdStatus::empty(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Ppu {
    line: u8,
    dot: u32,
    mode: PpuMode,
    frames: u64,
}

impl Ppu {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn mode(&self) -> PpuMode {
        self.mode
    }

    pub const fn line(&self) -> u8 {
        self.line
    }

    /// Completed frames since power-on.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one machine cycle (four dots). Returns the cycles consumed.
    pub fn clock(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        let lcdc = LcdControl::from_bits_truncate(bus.read(LCDC_ADDR));
        if !lcdc.contains(LcdControl::LCD_ENABLE) {
            if self.line != 0 || self.dot != 0 || self.mode != PpuMode::HBlank {
                trace!("LCD disabled, resetting timing");
                self.line = 0;
                self.dot = 0;
                self.mode = PpuMode::HBlank;
                self.publish(bus, false);
            }
            return 1;
        }

        self.dot += DOTS_PER_CYCLE;
        let mut line_changed = false;
        if self.dot >= DOTS_PER_LINE {
            self.dot -= DOTS_PER_LINE;
            self.line += 1;
            if self.line >= LINES_PER_FRAME {
                self.line = 0;
                self.frames += 1;
            }
            line_changed = true;
        }

        let mode = PpuMode::at(self.line, self.dot);
        let mut requests = InterruptMask::empty();
        if mode != self.mode {
            let stat = LcdStatus::from_bits_truncate(bus.read(STAT_ADDR));
            if mode == PpuMode::VBlank {
                requests.insert(InterruptMask::VBLANK);
            }
            if stat.contains(mode.stat_source()) && !mode.stat_source().is_empty() {
                requests.insert(InterruptMask::LCD_STAT);
            }
            self.mode = mode;
        }
        if self.publish(bus, line_changed) {
            requests.insert(InterruptMask::LCD_STAT);
        }
        if !requests.is_empty() {
            let pending = bus.read(IF_ADDR);
            bus.write(IF_ADDR, pending | requests.bits());
        }
        1
    }

    /// Writes LY and the STAT mode/coincidence bits. Returns true when LY
    /// just started matching LYC with the LYC interrupt enabled.
    fn publish(&self, bus: &mut dyn MemoryBus, line_changed: bool) -> bool {
        bus.write(LY_ADDR, self.line);
        let mut stat = LcdStatus::from_bits_truncate(bus.read(STAT_ADDR));
        let coincidence = bus.read(LYC_ADDR) == self.line;
        stat.remove(LcdStatus::MODE_FLAG_MASK);
        stat.insert(LcdStatus::from_bits_truncate(self.mode as u8));
        stat.set(LcdStatus::LYC_EQUAL_LY, coincidence);
        bus.write(STAT_ADDR, stat.bits());
        line_changed && coincidence && stat.contains(LcdStatus::LYC_INTERRUPT)
    }
}
