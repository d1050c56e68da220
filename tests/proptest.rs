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

//! Property-based tests for the lot engine.
//!
//! These tests verify invariants that should hold for any plate, any price
//! and any sequence of admissions and removals.

use carpark_rs::storage::{decode, encode};
use carpark_rs::{Engine, LotError, ManualClock, MemoryStorage, Plate, PricingConfig};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Generate a non-negative price (0.00 to 100.00).
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_legacy_plate() -> impl Strategy<Value = String> {
    "[A-Z]{3}[0-9]{4}"
}

fn arb_mercosul_plate() -> impl Strategy<Value = String> {
    "[A-Z]{3}[0-9][A-Z0-9][0-9]{2}"
}

fn arb_valid_plate() -> impl Strategy<Value = String> {
    prop_oneof![arb_legacy_plate(), arb_mercosul_plate()]
}

/// Lot operations for random sequences.
#[derive(Debug, Clone)]
enum Op {
    Admit(String),
    Remove(String, Option<u8>),
    Wait(u16),
}

fn arb_op() -> impl Strategy<Value = Op> {
    // A small plate pool makes duplicates and removals likely.
    let plate = prop::sample::select(vec!["ABC1234", "BRA2E19", "XYZ9876", "QWE1R23"]);
    prop_oneof![
        plate.clone().prop_map(|p| Op::Admit(p.to_owned())),
        (plate, prop::option::of(0u8..24)).prop_map(|(p, h)| Op::Remove(p.to_owned(), h)),
        (1u16..600).prop_map(Op::Wait),
    ]
}

fn engine_with<'a>(
    storage: &'a MemoryStorage,
    clock: &'a ManualClock,
    pricing: PricingConfig,
) -> Engine<&'a MemoryStorage, &'a ManualClock> {
    Engine::with_pricing(storage, clock, pricing)
}

// =============================================================================
// Plate Grammar Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every well-formed plate is admitted into an empty lot.
    #[test]
    fn valid_plates_are_admitted(raw in arb_valid_plate()) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        let mut engine = engine_with(&storage, &clock, PricingConfig::new(Decimal::ONE, Decimal::ONE));

        let admission = engine.admit(&raw).unwrap();
        prop_assert_eq!(admission.plate.as_str(), raw.as_str());
        prop_assert_eq!(engine.parked().len(), 1);
    }

    /// Case, surrounding whitespace and a hyphen never change the plate.
    #[test]
    fn normalization_is_transparent(raw in arb_valid_plate(), pad in "[ ]{0,3}") {
        let decorated = format!("{pad}{}-{}{pad}", &raw[..3], &raw[3..]).to_lowercase();
        prop_assert_eq!(Plate::parse(&decorated), Plate::parse(&raw));
    }

    /// Plates outside both grammars are rejected and nothing is parked.
    #[test]
    fn malformed_plates_are_rejected(raw in "[A-Z0-9]{0,9}") {
        let compact = raw.len() == 7
            && raw[..3].chars().all(|c| c.is_ascii_uppercase())
            && raw[3..4].chars().all(|c| c.is_ascii_digit())
            && raw[5..].chars().all(|c| c.is_ascii_digit());
        prop_assume!(!compact);

        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        let mut engine = engine_with(&storage, &clock, PricingConfig::new(Decimal::ONE, Decimal::ONE));

        prop_assert_eq!(engine.admit(&raw), Err(LotError::InvalidPlate));
        prop_assert!(engine.parked().is_empty());
    }
}

// =============================================================================
// Fee Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Explicit hours bill exactly initial + hours * hourly.
    #[test]
    fn explicit_hours_fee(initial in arb_price(), hourly in arb_price(), hours in 0u32..1000) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        let mut engine = engine_with(&storage, &clock, PricingConfig::new(initial, hourly));

        engine.admit("ABC1234").unwrap();
        let departure = engine.remove("ABC1234", Some(&hours.to_string())).unwrap();

        prop_assert_eq!(departure.entry.amount_charged, initial + Decimal::from(hours) * hourly);
    }

    /// Automatic billing charges the elapsed time rounded up to whole hours.
    #[test]
    fn automatic_hours_round_up(minutes in 0i64..10_000) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        let mut engine = engine_with(&storage, &clock, PricingConfig::new(Decimal::ONE, Decimal::TWO));

        engine.admit("ABC1234").unwrap();
        clock.advance(TimeDelta::minutes(minutes));
        let departure = engine.remove("ABC1234", None).unwrap();

        let expected_hours = (minutes + 59) / 60;
        prop_assert_eq!(departure.entry.hours_billed, expected_hours as f64);
        prop_assert!(departure.entry.hours_billed >= departure.elapsed_hours);
        prop_assert!(departure.entry.hours_billed - departure.elapsed_hours < 1.0);
        prop_assert_eq!(
            departure.entry.amount_charged,
            Decimal::ONE + Decimal::from(expected_hours) * Decimal::TWO
        );
    }
}

// =============================================================================
// State Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Any sequence of operations keeps plates unique, exits after entries,
    /// revenue equal to the history sum, and storage in sync with memory.
    #[test]
    fn operation_sequences_keep_invariants(ops in prop::collection::vec(arb_op(), 1..60)) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        let mut engine = engine_with(&storage, &clock, PricingConfig::new(Decimal::new(500, 2), Decimal::new(200, 2)));

        for op in ops {
            let parked_before = engine.parked().len();
            let history_before = engine.summarize().history.len();
            match op {
                Op::Admit(plate) => match engine.admit(&plate) {
                    Ok(_) => prop_assert_eq!(engine.parked().len(), parked_before + 1),
                    Err(e) => {
                        prop_assert_eq!(e, LotError::AlreadyParked);
                        prop_assert_eq!(engine.parked().len(), parked_before);
                    }
                },
                Op::Remove(plate, hours) => {
                    let hours = hours.map(|h| h.to_string());
                    match engine.remove(&plate, hours.as_deref()) {
                        Ok(_) => {
                            prop_assert_eq!(engine.parked().len(), parked_before - 1);
                            prop_assert_eq!(engine.summarize().history.len(), history_before + 1);
                        }
                        Err(e) => {
                            prop_assert_eq!(e, LotError::NotParked);
                            prop_assert_eq!(engine.summarize().history.len(), history_before);
                        }
                    }
                }
                Op::Wait(minutes) => clock.advance(TimeDelta::minutes(i64::from(minutes))),
            }
        }

        let plates: HashSet<_> = engine.parked().iter().map(|v| v.plate.clone()).collect();
        prop_assert_eq!(plates.len(), engine.parked().len());

        let summary = engine.summarize();
        for entry in summary.history {
            prop_assert!(entry.exit_time >= entry.entry_time);
            prop_assert_eq!(entry.amount_charged, entry.amount_charged.round_dp(2));
        }
        let sum: Decimal = summary.history.iter().map(|h| h.amount_charged).sum();
        prop_assert_eq!(summary.total_revenue, sum);

        let stored = decode(&storage.document().unwrap()).unwrap();
        prop_assert_eq!(&stored, engine.state());
    }

    /// Encoding then decoding reproduces the state exactly.
    #[test]
    fn document_round_trip(ops in prop::collection::vec(arb_op(), 0..30)) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        let mut engine = engine_with(&storage, &clock, PricingConfig::new(Decimal::new(350, 2), Decimal::new(125, 2)));

        for op in ops {
            let _ = match op {
                Op::Admit(plate) => engine.admit(&plate).map(|_| ()),
                Op::Remove(plate, hours) => engine
                    .remove(&plate, hours.map(|h| h.to_string()).as_deref())
                    .map(|_| ()),
                Op::Wait(minutes) => {
                    clock.advance(TimeDelta::minutes(i64::from(minutes)));
                    Ok(())
                }
            };
        }

        let text = encode(engine.state()).unwrap();
        prop_assert_eq!(&decode(&text).unwrap(), engine.state());
    }
}
