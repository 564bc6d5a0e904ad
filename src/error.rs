// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for decoding wave data and merging counts.

/// Errors that abort a merge run.
///
/// Every variant is fatal for the configuration being merged. Duplicate reports
/// are not errors: they are logged and counted in
/// [`Statistics`](crate::statistics::Statistics).
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Unexpected field value, wrong literal marker or malformed line.
    #[error("Format violation in {context}: {message}")]
    FormatViolation { context: String, message: String },

    /// A symmetry correction did not divide evenly.
    #[error(
        "Parity violation for <{token}>: total {total} and symmetric {symmetric} \
         do not divide by {divisor}"
    )]
    ParityViolation {
        token: String,
        total: u128,
        symmetric: u128,
        divisor: u128,
    },

    /// More symmetric models than models were reported.
    #[error("Symmetric count {symmetric} exceeds total {total} for <{token}>")]
    SymmetryExceedsTotal {
        token: String,
        total: u128,
        symmetric: u128,
    },

    /// A product or sum of counts does not fit in 128 bits.
    #[error("Count overflow for <{token}>")]
    CountOverflow { token: String },

    /// Reports that share a base block disagree on its symmetry.
    #[error("Inconsistent base symmetry for <{token}>: {first} vs {second}")]
    InconsistentBaseSymmetry {
        token: String,
        first: String,
        second: String,
    },

    /// The byte source ended inside a record.
    #[error("Stream exhausted after {bits_read} bits")]
    StreamExhausted { bits_read: u64 },

    /// The merge configuration cannot be run.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    pub(crate) fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        MergeError::FormatViolation {
            context: context.into(),
            message: message.into(),
        }
    }

    pub(crate) fn overflow(token: &impl ToString) -> Self {
        MergeError::CountOverflow {
            token: token.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
