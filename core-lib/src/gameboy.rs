/// core-lib/src/gameboy.rs
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::opcodes::{check_tables, TableError};
use crate::cpu::CPU;
use crate::mmu::{MmuError, MMU};
use crate::ppu::Ppu;
use anyhow::Context;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum GameBoyError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Mmu(#[from] MmuError),
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
}

/// CPU, bus and video unit driven by one shared cycle budget.
///
/// `schedule` is positive while the CPU owes the video unit cycles and
/// negative while the video unit owes the CPU; each `clock` call hands the
/// turn to whichever side is behind.
#[derive(Debug, Clone)]
pub struct GameBoy {
    pub cpu: CPU,
    pub mmu: MMU,
    pub ppu: Ppu,
    schedule: i64,
}

impl GameBoy {
    /// Builds a machine. With a boot ROM the CPU starts at 0x0000 in
    /// `Booting`; without one it starts from the post-boot state at 0x0100.
    pub fn new(cartridge: Option<Cartridge>, boot_rom: Option<&[u8]>) -> Result<Self, GameBoyError> {
        check_tables()?;
        let (cpu, mmu) = match boot_rom {
            Some(boot) => (CPU::new(), MMU::with_boot_rom(boot, cartridge)?),
            None => (CPU::post_boot(), MMU::new(cartridge)),
        };
        Ok(Self {
            cpu,
            mmu,
            ppu: Ppu::new(),
            schedule: 0,
        })
    }

    /// Loads the cartridge and boot ROM images from disk.
    pub fn from_files(rom: Option<&Path>, boot_rom: Option<&Path>) -> anyhow::Result<Self> {
        let cartridge = rom
            .map(|path| {
                Cartridge::load(path)
                    .with_context(|| format!("loading cartridge {}", path.display()))
            })
            .transpose()?;
        let boot = boot_rom
            .map(|path| {
                std::fs::read(path)
                    .with_context(|| format!("reading boot ROM {}", path.display()))
            })
            .transpose()?;
        if let Some(cart) = &cartridge {
            info!(title = %cart.title(), bytes = cart.len(), "cartridge ready");
        }
        Self::new(cartridge, boot.as_deref()).context("building machine")
    }

    /// Gives one turn to whichever unit is behind. Returns the cycles it consumed.
    pub fn clock(&mut self) -> u32 {
        if self.schedule >= 0 {
            let cycles = self.cpu.step(&mut self.mmu);
            self.schedule -= i64::from(cycles);
            cycles
        } else {
            let cycles = self.ppu.clock(&mut self.mmu);
            self.schedule += i64::from(cycles);
            cycles
        }
    }

    /// Clocks until the CPU has consumed at least `budget` machine cycles or
    /// `quit` is raised. The flag is only checked between steps. Returns the
    /// CPU cycles consumed.
    #[instrument(skip(self, quit), level = "debug")]
    pub fn run(&mut self, budget: u64, quit: &AtomicBool) -> u64 {
        let start = self.cpu.get_cycles();
        while self.cpu.get_cycles() - start < budget {
            if quit.load(Ordering::Relaxed) {
                debug!("quit requested");
                break;
            }
            self.clock();
        }
        self.cpu.get_cycles() - start
    }
}
