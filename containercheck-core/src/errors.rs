// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the narrow "input error" failure mode described in the
//! error handling design: a file that cannot even be attempted (I/O failure, or input
//! too short to hold any recognizable header). Everything an inspector *can* read and
//! finds wrong is reported as a `Diagnostic` in the returned report, never through this
//! type.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// `CheckError` enumerates the reasons an inspection could not even be attempted.
#[derive(Debug)]
pub enum CheckError {
    /// An I/O error occurred opening or reading the underlying file.
    IoError(Box<dyn StdError + Send + Sync>),
    /// The input was too short to contain the minimum header for the format.
    Truncated(&'static str),
    /// The requested operation is not supported by this build.
    Unsupported(&'static str),
    /// A documented resource ceiling was exceeded before any parsing could begin.
    LimitError(&'static str),
    Other(&'static str),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::IoError(err) => write!(f, "io error: {}", err),
            CheckError::Truncated(desc) => write!(f, "truncated input: {}", desc),
            CheckError::Unsupported(feature) => write!(f, "unsupported: {}", feature),
            CheckError::LimitError(constraint) => write!(f, "limit reached: {}", constraint),
            CheckError::Other(msg) => write!(f, "other error: {}", msg),
        }
    }
}

impl StdError for CheckError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CheckError::IoError(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> CheckError {
        CheckError::IoError(Box::new(err))
    }
}

pub type Result<T> = result::Result<T, CheckError>;

/// Convenience function to create a truncated-input error.
pub fn truncated_error<T>(desc: &'static str) -> Result<T> {
    Err(CheckError::Truncated(desc))
}

/// Convenience function to create an unsupported-feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(CheckError::Unsupported(feature))
}

/// Convenience function to create a limit error.
pub fn limit_error<T>(constraint: &'static str) -> Result<T> {
    Err(CheckError::LimitError(constraint))
}

/// Convenience function to create a catch-all error.
pub fn other_error<T>(msg: &'static str) -> Result<T> {
    Err(CheckError::Other(msg))
}
