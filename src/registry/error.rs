//! Registry error types
//!
//! Error types for session registry and group index operations.

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Identity was empty or whitespace-only at bind time
    InvalidIdentity,
    /// Group name was empty or whitespace-only
    InvalidGroupName,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::InvalidIdentity => write!(f, "Identity must not be empty"),
            RegistryError::InvalidGroupName => write!(f, "Group name must not be empty"),
        }
    }
}

impl std::error::Error for RegistryError {}
