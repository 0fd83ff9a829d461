//! Errors raised by queries against a loaded sequence.
//!
//! Loading a sequence reports failures as [eyre::Report]s with file
//! context. Once a sequence is loaded, every fallible query returns
//! this [Error] instead, so callers can match on the failure kind.

use crate::types::{Modality, Timestamp};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure kinds of the query surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A camera or modality reference does not exist in the
    /// configuration.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller supplied a parameter outside of its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A timestamp cannot be interpolated because it is not bracketed
    /// by recorded samples.
    #[error("timestamp {stamp} is outside of the recorded {modality} range{}", fmt_bounds(.bounds))]
    OutOfRange {
        modality: Modality,
        stamp: Timestamp,
        /// First and last recorded timestamp, `None` for an empty stream.
        bounds: Option<(Timestamp, Timestamp)>,
    },
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_argument(what: impl Into<String>) -> Self {
        Self::InvalidArgument(what.into())
    }

    pub fn out_of_range(
        modality: Modality,
        stamp: Timestamp,
        bounds: Option<(Timestamp, Timestamp)>,
    ) -> Self {
        Self::OutOfRange {
            modality,
            stamp,
            bounds,
        }
    }
}

fn fmt_bounds(bounds: &Option<(Timestamp, Timestamp)>) -> String {
    match bounds {
        Some((min, max)) => format!(" [{min}, {max}]"),
        None => " (stream is empty)".to_string(),
    }
}
