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

//! History export.

use crate::state::HistoryEntry;
use csv::Writer;
use std::io::Write;

/// Writes closed stays as CSV, one row per entry, in history order.
///
/// # CSV Format
///
/// Columns: `plate, entry_time, exit_time, hours_billed, amount_charged`
///
/// ```csv
/// plate,entry_time,exit_time,hours_billed,amount_charged
/// ABC1234,2025-01-01T08:00:00,2025-01-01T11:00:00,3.0,11.00
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_history<'a, W, I>(entries: I, writer: W) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a HistoryEntry>,
{
    let mut wtr = Writer::from_writer(writer);

    for entry in entries {
        wtr.serialize(entry)?;
    }

    wtr.flush()?;
    Ok(())
}
