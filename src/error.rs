use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by the boundary operation.
///
/// Every fault is converted exactly once into one of these two variants; the
/// `Display` output is the human-readable description handed to callers.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: bad domain, bad coordinates, bad wall parameters.
    /// Raised before any site is processed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Anything that went wrong while processing cells.
    #[error("internal fault while computing the Voronoi grid: {0}")]
    InternalFault(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn fault(msg: impl Into<String>) -> Self {
        Error::InternalFault(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    pub fn is_internal_fault(&self) -> bool {
        matches!(self, Error::InternalFault(_))
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::InternalFault(format!("allocation failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
