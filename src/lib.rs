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

//! # Carpark
//!
//! This library tracks the vehicles parked in a lot, bills each stay when the
//! vehicle leaves and keeps the whole lot state in a local JSON file.
//!
//! ## Core Components
//!
//! - [`Engine`]: Owns the lot state and performs admissions, removals and
//!   price changes
//! - [`Plate`]: Normalized plate accepted under the legacy or Mercosul grammar
//! - [`PricingConfig`]: Initial and hourly fee, and the fee formula
//! - [`Storage`]: Where the state lives between runs ([`JsonFileStorage`])
//! - [`LotError`]: Why an operation was refused
//!
//! ## Example
//!
//! ```
//! use carpark_rs::{Engine, LotError, MemoryStorage, PricingConfig, SystemClock};
//! use rust_decimal_macros::dec;
//!
//! let storage = MemoryStorage::new();
//! let pricing = PricingConfig::new(dec!(5.00), dec!(2.00));
//! let mut engine = Engine::with_pricing(&storage, SystemClock, pricing);
//!
//! engine.admit("ABC1D23").unwrap();
//! assert_eq!(engine.admit("abc-1d23"), Err(LotError::AlreadyParked));
//!
//! // Explicit hours override the clock
//! let departure = engine.remove("ABC1D23", Some("3")).unwrap();
//! assert_eq!(departure.entry.amount_charged, dec!(11.00));
//! assert_eq!(engine.summarize().total_revenue, dec!(11.00));
//! ```
//!
//! ## Concurrency
//!
//! The engine is a plain owned value driven by one caller at a time. Every
//! operation runs to completion, including its storage write, before
//! returning.

mod base;
mod clock;
pub mod console;
mod engine;
pub mod error;
pub mod input;
pub mod pricing;
pub mod report;
mod state;
pub mod storage;

pub use base::{Plate, PlateFormat};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Admission, Departure, Engine, Origin, Summary};
pub use error::{LotError, StorageError};
pub use input::{NumericInput, ScriptedInput};
pub use pricing::PricingConfig;
pub use state::{HistoryEntry, LotState, ParkedVehicle};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
