//! Error types for manifest parsing and patch construction

use std::path::PathBuf;
use thiserror::Error;

use crate::maxpat::BoxId;

/// Errors raised while reading inputs or building a patch
#[derive(Debug, Error)]
pub enum RnboError {
    /// Reading or writing a file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or written
    #[error("JSON error in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest parsed as JSON but does not have the expected shape
    #[error("Invalid DSP manifest: {0}")]
    Manifest(String),

    /// A line referenced a box that is not in the patcher
    #[error("No box with id '{0}' in patcher")]
    UnknownBox(BoxId),

    /// A line referenced an inlet or outlet the box does not have
    #[error("{direction} {index} out of range for box '{id}' ({available} available)")]
    PortOutOfRange {
        id: BoxId,
        direction: PortDirection,
        index: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Inlet,
    Outlet,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortDirection::Inlet => write!(f, "inlet"),
            PortDirection::Outlet => write!(f, "outlet"),
        }
    }
}

pub type Result<T> = std::result::Result<T, RnboError>;
