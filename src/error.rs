//! Crate-level error types
//!
//! The relay core treats almost nothing as fatal: validation failures and
//! unknown targets are dropped locally (see `routing`). The types here cover
//! the remaining failure modes at the server and wire edges.

use crate::registry::RegistryError;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, RelayError>;

/// Top-level error for server and transport operations
#[derive(Debug)]
pub enum RelayError {
    /// I/O error from the underlying socket
    Io(std::io::Error),
    /// Registry operation failure (e.g. invalid identity at bind time)
    Registry(RegistryError),
    /// Wire frame encode/decode failure
    Frame(FrameError),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Io(e) => write!(f, "I/O error: {}", e),
            RelayError::Registry(e) => write!(f, "Registry error: {}", e),
            RelayError::Frame(e) => write!(f, "Frame error: {}", e),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Io(e) => Some(e),
            RelayError::Registry(e) => Some(e),
            RelayError::Frame(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Io(e)
    }
}

impl From<RegistryError> for RelayError {
    fn from(e: RegistryError) -> Self {
        RelayError::Registry(e)
    }
}

impl From<FrameError> for RelayError {
    fn from(e: FrameError) -> Self {
        RelayError::Frame(e)
    }
}

/// Error type for the wire frame codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer ended before the value was complete
    UnexpectedEof,
    /// Unknown opcode byte
    InvalidOpcode(u8),
    /// String field was not valid UTF-8
    InvalidUtf8,
    /// Frame exceeds the configured maximum size
    FrameTooLarge { size: usize, max: usize },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::UnexpectedEof => write!(f, "Unexpected end of frame"),
            FrameError::InvalidOpcode(op) => write!(f, "Invalid opcode: 0x{:02X}", op),
            FrameError::InvalidUtf8 => write!(f, "Invalid UTF-8 in string field"),
            FrameError::FrameTooLarge { size, max } => {
                write!(f, "Frame too large: {} bytes (max {})", size, max)
            }
        }
    }
}

impl std::error::Error for FrameError {}
