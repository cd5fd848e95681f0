/// core-lib/src/cartridge/mod.rs
use std::path::Path;
use tracing::debug;

mod error;
pub use error::CartridgeError;

/// Header field offsets.
const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0143;
const CARTRIDGE_TYPE: usize = 0x0147;

/// Read-only cartridge image backing 0x0000..=0x7FFF.
///
/// Only the first 32 KiB are addressable; bank controllers are not mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    rom: Vec<u8>,
}

impl Cartridge {
    /// Largest image accepted (8 MiB, the biggest licensed cartridge).
    pub const MAX_SIZE: usize = 8 * 1024 * 1024;

    pub fn from_bytes(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        if rom.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if rom.len() > Self::MAX_SIZE {
            return Err(CartridgeError::TooLarge(rom.len()));
        }
        let cartridge = Self { rom };
        debug!(
            title = %cartridge.title(),
            size = cartridge.len(),
            kind = ?cartridge.cartridge_type(),
            "cartridge loaded"
        );
        Ok(cartridge)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let rom = std::fs::read(path).map_err(|source| CartridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(rom)
    }

    /// Byte at `addr`; addresses past the end of the image read as 0xFF.
    pub fn read(&self, addr: u16) -> u8 {
        self.rom.get(usize::from(addr)).copied().unwrap_or(0xFF)
    }

    /// Game title from the header, trimmed at the first NUL.
    pub fn title(&self) -> String {
        self.rom
            .get(TITLE_START..=TITLE_END)
            .unwrap_or_default()
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| char::from(b))
            .collect()
    }

    /// Raw cartridge type byte (0x0147), if the header is present.
    pub fn cartridge_type(&self) -> Option<u8> {
        self.rom.get(CARTRIDGE_TYPE).copied()
    }

    pub fn len(&self) -> usize {
        self.rom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rom.is_empty()
    }
}
