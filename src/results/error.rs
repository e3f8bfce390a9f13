// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResultsError>;

#[derive(Error, Debug)]
pub enum ResultsError {
    /// A match-expression operator the filter language has no translation for
    #[error("Tekton results operator '{0}' conversion not implemented")]
    UnsupportedOperator(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The Results service answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResultsError {
    /// HTTP status carried by the error, if any
    ///
    /// `NotFound` reports 404 so that callers can treat a missing log the same
    /// way as a missing list path.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResultsError::Status { status, .. } => Some(*status),
            ResultsError::Http(e) => e.status().map(|s| s.as_u16()),
            ResultsError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
