//! Registry error types

use thiserror::Error;

use super::frame::ClientId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Client is not registered (already removed, or never added)
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),
}
