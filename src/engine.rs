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

//! Lot engine.
//!
//! The [`Engine`] owns the [`LotState`] and performs every state transition:
//!
//! - **Admit**: Park a vehicle under a validated, unique plate.
//! - **Remove**: Bill the stay, move the vehicle into the history.
//! - **Update pricing**: Replace both fees.
//!
//! Each successful transition is followed by a write to [`Storage`]. A failed
//! write is logged and remembered in [`Engine::last_persist_error`], but the
//! operation still succeeds: memory stays authoritative for the rest of the
//! session.
//!
//! # Example
//!
//! ```
//! use carpark_rs::{Engine, ManualClock, MemoryStorage, PricingConfig};
//! use chrono::{NaiveDate, TimeDelta};
//! use rust_decimal_macros::dec;
//!
//! let clock = ManualClock::new(
//!     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
//! );
//! let storage = MemoryStorage::new();
//! let pricing = PricingConfig::new(dec!(5.00), dec!(2.00));
//! let mut engine = Engine::with_pricing(&storage, &clock, pricing);
//!
//! engine.admit("abc-1234").unwrap();
//! clock.advance(TimeDelta::minutes(90));
//!
//! let departure = engine.remove("ABC1234", None).unwrap();
//! assert_eq!(departure.entry.hours_billed, 2.0);
//! assert_eq!(departure.entry.amount_charged, dec!(9.00));
//! ```

use crate::base::Plate;
use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;
use crate::input::{NumericInput, parse_hours};
use crate::pricing::{PricingConfig, billable_hours, elapsed_hours};
use crate::state::{HistoryEntry, LotState, ParkedVehicle};
use crate::storage::Storage;
use crate::LotError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

const INITIAL_FEE_PROMPT: &str = "Initial fee (e.g. 5,50):";
const HOURLY_FEE_PROMPT: &str = "Hourly fee (e.g. 2,00):";

/// Result of a successful admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub plate: Plate,
    pub entry_time: NaiveDateTime,
}

/// Result of a successful removal.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    /// The history entry that was recorded.
    pub entry: HistoryEntry,
    /// Real time spent in the lot, in hours, before any rounding.
    pub elapsed_hours: f64,
    /// `true` when hours were derived from the clock rather than supplied.
    pub automatic: bool,
}

/// Read-only report over the history.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<'a> {
    pub history: &'a [HistoryEntry],
    pub occupied: usize,
    pub total_revenue: Decimal,
}

/// Where the engine's state came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Loaded from storage.
    Restored,
    /// No usable stored state; prices were collected and a new lot created.
    Fresh,
}

/// Parking lot engine.
///
/// # Invariants
///
/// - No two parked vehicles share a plate.
/// - History is append-only and every entry has `exit_time >= entry_time`.
/// - Money is rounded to two decimals before it is stored.
/// - A failed validation leaves the state untouched.
pub struct Engine<S, C = SystemClock> {
    state: LotState,
    storage: S,
    clock: C,
    origin: Origin,
    last_persist_error: Option<StorageError>,
}

impl<S: Storage> Engine<S> {
    /// Loads the lot from `storage`, or runs the first-run pricing flow.
    ///
    /// # Errors
    ///
    /// Only input errors from `input` are returned; storage problems fall
    /// back to a fresh lot.
    pub fn initialize(storage: S, input: impl NumericInput) -> Result<Self, LotError> {
        Self::initialize_with_clock(storage, SystemClock, input)
    }
}

impl<S: Storage, C: Clock> Engine<S, C> {
    /// [`Engine::initialize`] with an explicit time source.
    ///
    /// # Errors
    ///
    /// - [`LotError::InputClosed`] - Input ended before both fees were read.
    /// - [`LotError::InvalidPrice`] - A fee read from `input` was negative.
    pub fn initialize_with_clock(
        storage: S,
        clock: C,
        mut input: impl NumericInput,
    ) -> Result<Self, LotError> {
        match Self::restore(storage, clock) {
            Ok(engine) => Ok(engine),
            Err((storage, clock, error)) => {
                log::warn!("no usable lot state ({error}), starting fresh");
                let initial = input.read_decimal(INITIAL_FEE_PROMPT)?;
                let hourly = input.read_decimal(HOURLY_FEE_PROMPT)?;
                let pricing = PricingConfig::validated(initial, hourly)?;
                Ok(Self::with_pricing(storage, clock, pricing))
            }
        }
    }

    /// Loads the lot from `storage`, handing the parts back on failure.
    #[allow(clippy::result_large_err)]
    pub fn restore(storage: S, clock: C) -> Result<Self, (S, C, StorageError)> {
        match storage.load() {
            Ok(state) => {
                log::info!(
                    "restored lot: {} parked, {} closed stays",
                    state.vehicles().len(),
                    state.history().len()
                );
                Ok(Self {
                    state,
                    storage,
                    clock,
                    origin: Origin::Restored,
                    last_persist_error: None,
                })
            }
            Err(error) => Err((storage, clock, error)),
        }
    }

    /// Creates an empty lot and persists it immediately.
    pub fn with_pricing(storage: S, clock: C, pricing: PricingConfig) -> Self {
        let mut engine = Self {
            state: LotState::new(pricing),
            storage,
            clock,
            origin: Origin::Fresh,
            last_persist_error: None,
        };
        log::info!(
            "created lot: initial fee {}, hourly fee {}",
            pricing.initial_fee(),
            pricing.hourly_fee()
        );
        engine.persist();
        engine
    }

    /// Parks a vehicle.
    ///
    /// # Errors
    ///
    /// - [`LotError::InvalidPlate`] - Plate is blank or malformed.
    /// - [`LotError::AlreadyParked`] - A vehicle with this plate is in the lot.
    pub fn admit(&mut self, raw_plate: &str) -> Result<Admission, LotError> {
        let plate = Plate::parse(raw_plate).inspect_err(|_| {
            log::debug!("rejected plate {raw_plate:?}");
        })?;
        if self.state.is_parked(&plate) {
            return Err(LotError::AlreadyParked);
        }

        let entry_time = self.clock.now();
        self.state.park(ParkedVehicle {
            plate: plate.clone(),
            entry_time,
        });
        log::info!("admitted {plate} at {entry_time}");
        self.persist();

        Ok(Admission { plate, entry_time })
    }

    /// Removes a vehicle and bills the stay.
    ///
    /// With no `explicit_hours` (or a blank one) the stay is billed by the
    /// clock, rounded up to whole hours. Otherwise the given hours are
    /// billed as-is.
    ///
    /// # Errors
    ///
    /// - [`LotError::InvalidPlate`] - Plate is blank or malformed.
    /// - [`LotError::NotParked`] - No parked vehicle has this plate.
    /// - [`LotError::InvalidHours`] - Override is negative or unparsable.
    pub fn remove(
        &mut self,
        raw_plate: &str,
        explicit_hours: Option<&str>,
    ) -> Result<Departure, LotError> {
        let plate = Plate::parse(raw_plate)?;
        let index = self.state.position(&plate).ok_or(LotError::NotParked)?;
        let entry_time = self.state.vehicles()[index].entry_time;

        // Exit never precedes entry, even if the wall clock went backwards.
        let exit_time = self.clock.now().max(entry_time);
        let elapsed = exit_time - entry_time;

        let explicit = explicit_hours.map(str::trim).filter(|raw| !raw.is_empty());
        let hours_billed = match explicit {
            Some(raw) => parse_hours(raw)?,
            None => billable_hours(elapsed),
        };
        let amount_charged = self.state.pricing().charge(hours_billed)?;

        let vehicle = self.state.unpark(index);
        let entry = HistoryEntry {
            plate: vehicle.plate,
            entry_time,
            exit_time,
            hours_billed,
            amount_charged,
        };
        self.state.record(entry.clone());
        log::info!("removed {plate}: {hours_billed}h billed, charged {amount_charged}");
        self.persist();

        Ok(Departure {
            entry,
            elapsed_hours: elapsed_hours(elapsed),
            automatic: explicit.is_none(),
        })
    }

    /// Replaces both fees, each rounded to two decimals.
    ///
    /// # Errors
    ///
    /// [`LotError::InvalidPrice`] if either fee is negative; pricing is left
    /// unchanged.
    pub fn update_pricing(
        &mut self,
        initial_fee: Decimal,
        hourly_fee: Decimal,
    ) -> Result<PricingConfig, LotError> {
        let pricing = PricingConfig::validated(initial_fee, hourly_fee)?;
        self.state.set_pricing(pricing);
        log::info!(
            "pricing updated: initial fee {}, hourly fee {}",
            pricing.initial_fee(),
            pricing.hourly_fee()
        );
        self.persist();
        Ok(pricing)
    }
}

impl<S, C> Engine<S, C> {
    /// Parked vehicles in admission order. Empty when the lot is empty.
    pub fn parked(&self) -> &[ParkedVehicle] {
        self.state.vehicles()
    }

    /// History, current occupancy and total revenue.
    pub fn summarize(&self) -> Summary<'_> {
        Summary {
            history: self.state.history(),
            occupied: self.state.vehicles().len(),
            total_revenue: self.state.total_revenue(),
        }
    }

    pub fn pricing(&self) -> PricingConfig {
        self.state.pricing()
    }

    pub fn state(&self) -> &LotState {
        &self.state
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Error from the most recent write, cleared by the next good write.
    pub fn last_persist_error(&self) -> Option<&StorageError> {
        self.last_persist_error.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage, C> Engine<S, C> {
    fn persist(&mut self) {
        let outcome = self.storage.save(&self.state);
        self.observe_persist(outcome);
    }

    fn observe_persist(&mut self, outcome: Result<(), StorageError>) {
        match outcome {
            Ok(()) => self.last_persist_error = None,
            Err(error) => {
                log::warn!("failed to persist lot state: {error}");
                self.last_persist_error = Some(error);
            }
        }
    }
}
