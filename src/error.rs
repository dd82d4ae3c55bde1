// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced to the user. None of them are fatal: the operation that
/// produced one is abandoned and previously committed state stays as it was.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport failure: connection refused, timeout, undecodable body.
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Malformed import file. Nothing from the file has been applied.
    #[error("import failed at row {row}: {reason}")]
    Import { row: usize, reason: String },

    #[error(transparent)]
    Store(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn import(row: usize, reason: impl Into<String>) -> Self {
        LedgerError::Import {
            row,
            reason: reason.into(),
        }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
