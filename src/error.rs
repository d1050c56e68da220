// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Error types for lot operations and persistence.

use thiserror::Error;

/// Lot operation errors.
///
/// Every variant aborts only the operation that produced it; the lot state
/// is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LotError {
    /// Plate is empty or matches neither the legacy nor the Mercosul grammar
    #[error("invalid plate (expected ABC1234 or ABC1D23)")]
    InvalidPlate,

    /// A vehicle with the same plate is already parked
    #[error("vehicle already parked")]
    AlreadyParked,

    /// No parked vehicle has this plate
    #[error("vehicle not parked")]
    NotParked,

    /// Explicit hour override is negative or not a number
    #[error("invalid hours (must be a non-negative number)")]
    InvalidHours,

    /// Price is negative
    #[error("invalid price (must not be negative)")]
    InvalidPrice,

    /// The numeric input source was closed before a value was read
    #[error("input closed")]
    InputClosed,
}

/// Persistence errors.
///
/// These never abort a lot operation. The engine logs them and keeps its
/// in-memory state authoritative.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage location could not be read or written
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not a valid lot state
    #[error("malformed lot document: {0}")]
    Format(#[from] serde_json::Error),

    /// The stored document parses but breaks a lot invariant
    #[error("inconsistent lot document: {0}")]
    Invalid(String),

    /// Nothing has been stored yet
    #[error("no stored lot state")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::{LotError, StorageError};

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LotError::InvalidPlate.to_string(),
            "invalid plate (expected ABC1234 or ABC1D23)"
        );
        assert_eq!(LotError::AlreadyParked.to_string(), "vehicle already parked");
        assert_eq!(LotError::NotParked.to_string(), "vehicle not parked");
        assert_eq!(
            LotError::InvalidHours.to_string(),
            "invalid hours (must be a non-negative number)"
        );
        assert_eq!(
            LotError::InvalidPrice.to_string(),
            "invalid price (must not be negative)"
        );
        assert_eq!(LotError::InputClosed.to_string(), "input closed");
    }

    #[test]
    fn storage_errors_wrap_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = StorageError::from(io);
        assert!(matches!(err, StorageError::Io(_)));
        assert!(err.to_string().starts_with("storage i/o failed"));

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StorageError::from(parse);
        assert!(matches!(err, StorageError::Format(_)));

        let err = StorageError::Invalid("ABC1234 parked more than once".to_owned());
        assert_eq!(
            err.to_string(),
            "inconsistent lot document: ABC1234 parked more than once"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LotError::AlreadyParked;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
