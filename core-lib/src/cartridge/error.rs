use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading a cartridge image
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("Failed to read cartridge image {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cartridge image is empty")]
    Empty,
    #[error("Cartridge image too large: {0} bytes")]
    TooLarge(usize),
}
