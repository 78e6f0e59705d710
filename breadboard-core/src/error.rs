//! Error kinds of the composition engine.
//!
//! Placement failures ([`DrawError`]) are handled softly by the layer, while
//! [`LayerError`] is returned before anything is mutated.

use thiserror::Error;

use crate::geometry::CellIdx;
use crate::plate::PlateId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {idx} is outside the {cols}x{rows} grid")]
    OutOfBounds { idx: CellIdx, cols: i32, rows: i32 },
    #[error("grid must have at least one cell, got {cols}x{rows}")]
    EmptyDim { cols: i32, rows: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("plate type '{0}' not found")]
    TypeNotFound(String),
}

/// Why a plate could not be drawn at the requested place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    #[error("plate '{alias}' does not fit: {source}")]
    OutOfBounds {
        alias: &'static str,
        #[source]
        source: GridError,
    },
    #[error("plate '{alias}' has invalid property '{key}': {reason}")]
    InvalidProperty { alias: &'static str, key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    /// A required placement argument is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("plate {0} does not exist")]
    PlateNotFound(PlateId),
}

impl LayerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LayerError::InvalidArgument(msg.into())
    }
}

pub type LayerResult<T> = Result<T, LayerError>;
