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

//! Lot state: prices, parked vehicles and the history of closed stays.
//!
//! [`LotState`] is the unit of persistence. Vehicles keep admission order and
//! history is append-only, so both serialize in the order they happened.

use crate::base::Plate;
use crate::error::StorageError;
use crate::pricing::{PricingConfig, round_money};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A vehicle currently in the lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkedVehicle {
    pub plate: Plate,
    pub entry_time: NaiveDateTime,
}

/// A closed stay. Never modified after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub plate: Plate,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub hours_billed: f64,
    pub amount_charged: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotState {
    #[serde(flatten)]
    pricing: PricingConfig,
    #[serde(default)]
    vehicles: Vec<ParkedVehicle>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl LotState {
    /// Creates an empty lot with the given prices.
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            pricing,
            vehicles: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn pricing(&self) -> PricingConfig {
        self.pricing
    }

    /// Parked vehicles in admission order.
    pub fn vehicles(&self) -> &[ParkedVehicle] {
        &self.vehicles
    }

    /// Closed stays in chronological order.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_parked(&self, plate: &Plate) -> bool {
        self.position(plate).is_some()
    }

    /// Sum of every amount charged so far. Saturates instead of overflowing.
    pub fn total_revenue(&self) -> Decimal {
        self.history
            .iter()
            .fold(Decimal::ZERO, |total, entry| total.saturating_add(entry.amount_charged))
    }

    pub(crate) fn position(&self, plate: &Plate) -> Option<usize> {
        self.vehicles.iter().position(|v| &v.plate == plate)
    }

    pub(crate) fn set_pricing(&mut self, pricing: PricingConfig) {
        self.pricing = pricing;
    }

    pub(crate) fn park(&mut self, vehicle: ParkedVehicle) {
        self.vehicles.push(vehicle);
    }

    /// Removes the vehicle at `index`, keeping the order of the rest.
    pub(crate) fn unpark(&mut self, index: usize) -> ParkedVehicle {
        self.vehicles.remove(index)
    }

    pub(crate) fn record(&mut self, entry: HistoryEntry) {
        debug_assert!(
            entry.exit_time >= entry.entry_time,
            "Invariant violated: exit {} before entry {}",
            entry.exit_time,
            entry.entry_time
        );
        self.history.push(entry);
    }

    /// Re-applies money rounding to values read from storage and checks the
    /// lot invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// [`StorageError::Invalid`] if a plate is parked twice, a stay ends
    /// before it starts, billed hours are negative or not finite, an amount
    /// is negative, or the amounts cannot be summed.
    pub(crate) fn validated(mut self) -> Result<Self, StorageError> {
        self.pricing = PricingConfig::new(self.pricing.initial_fee(), self.pricing.hourly_fee());

        let mut seen = HashSet::new();
        for vehicle in &self.vehicles {
            if !seen.insert(&vehicle.plate) {
                return Err(StorageError::Invalid(format!(
                    "{} parked more than once",
                    vehicle.plate
                )));
            }
        }

        let mut revenue = Decimal::ZERO;
        for entry in &mut self.history {
            if entry.exit_time < entry.entry_time {
                return Err(StorageError::Invalid(format!(
                    "{} left at {} before entering at {}",
                    entry.plate, entry.exit_time, entry.entry_time
                )));
            }
            if !entry.hours_billed.is_finite() || entry.hours_billed < 0.0 {
                return Err(StorageError::Invalid(format!(
                    "{} billed {} hours",
                    entry.plate, entry.hours_billed
                )));
            }
            if entry.amount_charged < Decimal::ZERO {
                return Err(StorageError::Invalid(format!(
                    "{} charged {}",
                    entry.plate, entry.amount_charged
                )));
            }
            entry.amount_charged = round_money(entry.amount_charged);
            revenue = revenue
                .checked_add(entry.amount_charged)
                .ok_or_else(|| StorageError::Invalid("revenue total overflows".to_owned()))?;
        }

        Ok(self)
    }
}
