use thiserror::Error;

use crate::dimensions::DimensionError;
use crate::options::OptionsError;

/// Errors raised by a [`Job`](crate::Job).
///
/// Statuses reported by the routine itself are not errors; a solve that ran
/// returns them as an [`Inform`](crate::Inform).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Dimensions(#[from] DimensionError),

    #[error(transparent)]
    Options(#[from] OptionsError),

    /// A matrix argument does not match the stored shape.
    #[error("`{buffer}` expects a {}x{} matrix, got {}x{}", .expected.0, .expected.1, .found.0, .found.1)]
    ShapeMismatch {
        buffer: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A vector argument does not match the stored length.
    #[error("`{buffer}` expects {expected} values, got {found}")]
    LengthMismatch {
        buffer: &'static str,
        expected: usize,
        found: usize,
    },

    /// A per-element bound index is past the end of the bound vectors.
    #[error("bound index {index} is out of range for {len} bounds")]
    BoundIndex { index: usize, len: usize },

    /// Another solve is already in flight in this process.
    ///
    /// The routine is not re-entrant and its callbacks carry no context, so
    /// only one job may be solving at a time.
    #[error("another solve is already in progress")]
    SolveInProgress,
}

impl Error {
    pub(crate) fn check_len(
        buffer: &'static str,
        expected: usize,
        found: usize,
    ) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::LengthMismatch {
                buffer,
                expected,
                found,
            })
        }
    }

    pub(crate) fn check_shape(
        buffer: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::ShapeMismatch {
                buffer,
                expected,
                found,
            })
        }
    }
}
