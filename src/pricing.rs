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

//! Pricing configuration and fee computation.
//!
//! A stay costs `initial_fee + hours * hourly_fee`, rounded to two decimal
//! places. Without an explicit override, hours are the elapsed time rounded
//! up to the next whole hour.

use crate::LotError;
use chrono::TimeDelta;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Monetary precision used for storage and display.
pub const MONEY_DP: u32 = 2;

const SECONDS_PER_HOUR: i64 = 3600;

/// Rounds a monetary value to [`MONEY_DP`] places (banker's rounding) and
/// pads it to that scale, so `5` is stored as `5.00`.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(MONEY_DP);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Lot prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    initial_fee: Decimal,
    hourly_fee: Decimal,
}

impl PricingConfig {
    /// Builds a configuration, rounding both fees to two decimals.
    ///
    /// No sign check happens here; see [`PricingConfig::validated`].
    pub fn new(initial_fee: Decimal, hourly_fee: Decimal) -> Self {
        Self {
            initial_fee: round_money(initial_fee),
            hourly_fee: round_money(hourly_fee),
        }
    }

    /// Like [`PricingConfig::new`] but rejects negative fees.
    ///
    /// # Errors
    ///
    /// [`LotError::InvalidPrice`] if either fee is below zero.
    pub fn validated(initial_fee: Decimal, hourly_fee: Decimal) -> Result<Self, LotError> {
        if initial_fee < Decimal::ZERO || hourly_fee < Decimal::ZERO {
            return Err(LotError::InvalidPrice);
        }
        Ok(Self::new(initial_fee, hourly_fee))
    }

    pub fn initial_fee(&self) -> Decimal {
        self.initial_fee
    }

    pub fn hourly_fee(&self) -> Decimal {
        self.hourly_fee
    }

    /// Amount owed for a stay billed at `hours`.
    ///
    /// # Errors
    ///
    /// [`LotError::InvalidHours`] if `hours` is negative, not finite, or too
    /// large to be represented as a decimal amount.
    pub fn charge(&self, hours: f64) -> Result<Decimal, LotError> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(LotError::InvalidHours);
        }
        let hours = Decimal::from_f64(hours).ok_or(LotError::InvalidHours)?;
        let variable = hours
            .checked_mul(self.hourly_fee)
            .ok_or(LotError::InvalidHours)?;
        let total = self
            .initial_fee
            .checked_add(variable)
            .ok_or(LotError::InvalidHours)?;
        Ok(round_money(total))
    }
}

/// Whole hours to bill for `elapsed`, rounded up. Negative spans bill zero.
pub fn billable_hours(elapsed: TimeDelta) -> f64 {
    let seconds = elapsed.num_seconds().max(0);
    let hours = seconds / SECONDS_PER_HOUR + i64::from(seconds % SECONDS_PER_HOUR != 0);
    hours as f64
}

/// Unrounded elapsed hours, for display next to the billed figure.
pub fn elapsed_hours(elapsed: TimeDelta) -> f64 {
    elapsed.num_seconds().max(0) as f64 / SECONDS_PER_HOUR as f64
}
