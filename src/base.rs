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

//! Vehicle plate identifier.
//!
//! Two plate grammars are accepted, both checked on the normalized form
//! (trimmed, uppercased, hyphens removed):
//!
//! | Format | Grammar | Example |
//! |--------|---------|---------|
//! | Legacy | `[A-Z]{3}[0-9]{4}` | `ABC1234` |
//! | Mercosul | `[A-Z]{3}[0-9][A-Z0-9][0-9]{2}` | `ABC1D23` |

use crate::LotError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static LEGACY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}[0-9]{4}$").expect("legacy plate pattern"));

static MERCOSUL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{3}[0-9][A-Z0-9][0-9]{2}$").expect("mercosul plate pattern")
});

/// Plate grammar a [`Plate`] was accepted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateFormat {
    Legacy,
    Mercosul,
}

/// Validated, normalized vehicle plate.
///
/// Always uppercase with no surrounding whitespace and no hyphen, so
/// `" abc-1234 "` and `"ABC1234"` are the same plate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plate(String);

impl Plate {
    /// Normalizes and validates raw user input.
    ///
    /// # Errors
    ///
    /// [`LotError::InvalidPlate`] if the input is blank or fits neither grammar.
    pub fn parse(raw: &str) -> Result<Self, LotError> {
        let normalized = raw.trim().to_uppercase().replace('-', "");
        if normalized.is_empty() {
            return Err(LotError::InvalidPlate);
        }
        if LEGACY.is_match(&normalized) || MERCOSUL.is_match(&normalized) {
            Ok(Plate(normalized))
        } else {
            Err(LotError::InvalidPlate)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Legacy plates also satisfy the Mercosul grammar, so legacy wins.
    pub fn format(&self) -> PlateFormat {
        if LEGACY.is_match(&self.0) {
            PlateFormat::Legacy
        } else {
            PlateFormat::Mercosul
        }
    }
}

impl TryFrom<String> for Plate {
    type Error = LotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Plate::parse(&value)
    }
}

impl From<Plate> for String {
    fn from(plate: Plate) -> Self {
        plate.0
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}
