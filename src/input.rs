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

//! Numeric input normalization.
//!
//! Users type amounts the way they are used to: `5,50`, `5.50` or `1 200`.
//! Everything here turns that text into plain numbers before it reaches the
//! engine, which never sees raw locale-specific strings for money.

use crate::LotError;
use crate::pricing::round_money;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Source of decimal values for interactive flows (e.g. first-run pricing).
pub trait NumericInput {
    /// Reads one non-negative decimal.
    ///
    /// # Errors
    ///
    /// [`LotError::InputClosed`] when no more input can be read.
    fn read_decimal(&mut self, prompt: &str) -> Result<Decimal, LotError>;
}

impl<T: NumericInput + ?Sized> NumericInput for &mut T {
    fn read_decimal(&mut self, prompt: &str) -> Result<Decimal, LotError> {
        (**self).read_decimal(prompt)
    }
}

/// Canonical `123.45` form of a user-typed number.
///
/// Whitespace is dropped and a comma is read as the decimal separator.
/// Returns `None` for blank input or more than one separator.
pub fn normalize_number(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if compact.is_empty() || compact.matches('.').count() > 1 {
        return None;
    }
    Some(compact)
}

/// Parses a monetary amount, rounded to two places. Sign is preserved.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let normalized = normalize_number(raw)?;
    Decimal::from_str(&normalized).ok().map(round_money)
}

/// Parses an hour count.
///
/// # Errors
///
/// [`LotError::InvalidHours`] when the text is not a number, or is negative
/// or not finite.
pub fn parse_hours(raw: &str) -> Result<f64, LotError> {
    let hours: f64 = normalize_number(raw)
        .and_then(|n| n.parse().ok())
        .ok_or(LotError::InvalidHours)?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(LotError::InvalidHours);
    }
    // abs() folds -0 into 0
    Ok(hours.abs())
}

/// Fixed sequence of answers, for tests and non-interactive callers.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: std::collections::VecDeque<Decimal>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(answers: impl IntoIterator<Item = Decimal>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts seen so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl NumericInput for ScriptedInput {
    fn read_decimal(&mut self, prompt: &str) -> Result<Decimal, LotError> {
        self.prompts.push(prompt.to_owned());
        self.answers.pop_front().ok_or(LotError::InputClosed)
    }
}
