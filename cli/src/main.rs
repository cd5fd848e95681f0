/// gamegirl CLI
///
/// Runs ROMs headless and disassembles raw binaries.
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gamegirl_core::disasm::disassemble_from;
use gamegirl_core::GameBoy;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable trace logging of every executed instruction
    #[arg(long, global = true)]
    debug: bool,
    /// Enable debug logging of mode changes and interrupts
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Game Boy ROM headless for a fixed number of machine cycles
    Run {
        /// Path to the ROM file
        #[arg(
            value_name = "ROM_PATH",
            required_unless_present = "no_cartridge",
            conflicts_with = "no_cartridge"
        )]
        rom_path: Option<PathBuf>,
        /// Run with an empty cartridge slot
        #[arg(long)]
        no_cartridge: bool,
        /// 256-byte boot ROM to execute before the cartridge
        #[arg(long, value_name = "PATH")]
        boot_rom: Option<PathBuf>,
        /// Machine cycles to run
        #[arg(long, default_value_t = 1_000_000, value_parser = parse_number::<u64>)]
        cycles: u64,
    },
    /// Disassemble a raw binary
    Disasm {
        /// File to disassemble
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Byte offset to start at (decimal or 0x-prefixed hex)
        #[arg(long, default_value_t = 0, value_parser = parse_number::<usize>)]
        offset: usize,
        /// Number of instructions to print
        #[arg(long, default_value_t = 32, value_parser = parse_number::<usize>)]
        count: usize,
    },
}

/// Parses a decimal or `0x`-prefixed hexadecimal number.
fn parse_number<T>(text: &str) -> Result<T, String>
where
    T: TryFrom<u64>,
{
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    }
    .map_err(|e| format!("invalid number {text:?}: {e}"))?;
    T::try_from(value).map_err(|_| format!("{text} is out of range"))
}

/// `--debug` wins over `--verbose`; `RUST_LOG` overrides both.
fn init_tracing(debug: bool, verbose: bool) {
    let level = if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.verbose);
    match &cli.command {
        Commands::Run {
            rom_path,
            boot_rom,
            cycles,
            ..
        } => run_rom(rom_path.as_deref(), boot_rom.as_deref(), *cycles),
        Commands::Disasm {
            file,
            offset,
            count,
        } => disasm_file(file, *offset, *count),
    }
}

/// Builds the machine, runs it for `cycles` and prints the final state.
fn run_rom(rom_path: Option<&Path>, boot_rom: Option<&Path>, cycles: u64) -> anyhow::Result<()> {
    if let Some(path) = rom_path {
        if !path.exists() {
            bail!("ROM file not found: {}", path.display());
        }
    }
    let mut gb = GameBoy::from_files(rom_path, boot_rom)?;
    if let Some(cart) = gb.mmu.cartridge() {
        info!(title = %cart.title(), "running cartridge");
    }

    let quit = AtomicBool::new(false);
    let spent = gb.run(cycles, &quit);
    debug!(spent, frames = gb.ppu.frames(), "run finished");
    print!("{}", summary(&gb, spent));
    Ok(())
}

/// Final machine state as printed after `run`.
fn summary(gb: &GameBoy, spent: u64) -> String {
    let regs = &gb.cpu.regs;
    let mut out = String::new();
    let _ = writeln!(out, "cycles: {spent}");
    let _ = writeln!(out, "frames: {}", gb.ppu.frames());
    let _ = writeln!(out, "mode:   {:?}", gb.cpu.mode);
    let _ = writeln!(
        out,
        "af={:04x} bc={:04x} de={:04x} hl={:04x} sp={:04x} pc={:04x} ime={}",
        regs.af(),
        regs.bc(),
        regs.de(),
        regs.hl(),
        regs.sp,
        regs.pc,
        u8::from(gb.cpu.ime)
    );
    out
}

fn disasm_file(file: &Path, offset: usize, count: usize) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    if offset > bytes.len() {
        bail!(
            "offset {offset:#x} is past the end of {} ({} bytes)",
            file.display(),
            bytes.len()
        );
    }
    for line in disassemble_from(&bytes, offset, count) {
        println!("{line}");
    }
    Ok(())
}
