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

//! Terminal front end.
//!
//! Keyboard menu, line prompts, coloured messages and the tables shown by the
//! interactive binary. Table and formatting helpers write plain text to any
//! [`Write`] so they can be checked without a terminal.

use crate::LotError;
use crate::input::{NumericInput, parse_decimal};
use crate::pricing::round_money;
use crate::state::{HistoryEntry, ParkedVehicle};
use chrono::NaiveDateTime;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};

pub const TITLE: &str = "PARKING LOT";

const MIN_HEADER_WIDTH: usize = 20;
const MAX_HEADER_WIDTH: usize = 60;
const TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Clears the screen and draws a boxed, centred title.
pub fn draw_header(out: &mut impl Write, title: &str) -> io::Result<()> {
    let available = terminal::size()
        .map(|(cols, _)| usize::from(cols).saturating_sub(4))
        .unwrap_or(80);
    let width = available.clamp(MIN_HEADER_WIDTH, MAX_HEADER_WIDTH);
    let border = "═".repeat(width);

    execute!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "╔{border}╗\r\n║{}║\r\n╚{border}╝\r\n\r\n", centre(title, width))?;
    queue!(out, ResetColor)?;
    out.flush()
}

fn centre(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let left = width.saturating_sub(len) / 2;
    let right = width.saturating_sub(len + left);
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

/// Leaves raw mode when dropped, even on early return.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Arrow-key menu. Returns the index of the chosen option.
///
/// Up/Down wrap around; Enter selects; Esc selects the last option.
///
/// # Errors
///
/// [`io::ErrorKind::InvalidInput`] if `options` is empty.
pub fn select(title: &str, options: &[&str]) -> io::Result<usize> {
    if options.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "menu needs at least one option",
        ));
    }
    let mut index = 0;
    let mut out = io::stdout();
    let _raw = RawMode::enable()?;

    loop {
        draw_header(&mut out, title)?;
        for (i, option) in options.iter().enumerate() {
            if i == index {
                queue!(
                    out,
                    SetForegroundColor(Color::Black),
                    SetBackgroundColor(Color::Yellow),
                    Print(format!("> {option}")),
                    ResetColor,
                    Print("\r\n")
                )?;
            } else {
                queue!(out, Print(format!("  {option}\r\n")))?;
            }
        }
        out.flush()?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Up => index = index.checked_sub(1).unwrap_or(options.len() - 1),
            KeyCode::Down => index = (index + 1) % options.len(),
            KeyCode::Enter => return Ok(index),
            KeyCode::Esc => return Ok(options.len() - 1),
            _ => {}
        }
    }
}

/// Blocks until any key is pressed.
pub fn wait_for_key() -> io::Result<()> {
    let _raw = RawMode::enable()?;
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

/// Prints `prompt` and reads one line. `None` on end of input.
pub fn read_line(prompt: &str) -> io::Result<Option<String>> {
    let mut out = io::stdout();
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn failure(message: &str) {
    println!("{}", message.red());
}

pub fn notice(message: &str) {
    println!("{}", message.yellow());
}

pub fn heading(message: &str) {
    println!("{}", message.cyan());
}

/// User-facing sentence for a lot error.
pub fn describe(error: &LotError) -> &'static str {
    match error {
        LotError::InvalidPlate => "✖ Invalid plate. Use ABC1234 or ABC1D23 (Mercosul).",
        LotError::AlreadyParked => "✖ This vehicle is already parked.",
        LotError::NotParked => "✖ This vehicle is not parked here.",
        LotError::InvalidHours => "✖ Invalid number of hours.",
        LotError::InvalidPrice => "✖ Prices cannot be negative.",
        LotError::InputClosed => "✖ Input closed.",
    }
}

/// Interactive [`NumericInput`] that re-prompts until it gets a
/// non-negative amount.
#[derive(Debug, Default)]
pub struct ConsoleInput {
    notice: Option<String>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `notice` under the header before every prompt.
    pub fn with_notice(notice: impl Into<String>) -> Self {
        Self {
            notice: Some(notice.into()),
        }
    }

    fn ask(&self, prompt: &str) -> Result<String, LotError> {
        let mut out = io::stdout();
        draw_header(&mut out, TITLE).map_err(|_| LotError::InputClosed)?;
        if let Some(text) = &self.notice {
            println!("{text}\n");
        }
        println!("{prompt}");
        read_line("> ")
            .ok()
            .flatten()
            .ok_or(LotError::InputClosed)
    }

    /// Like [`NumericInput::read_decimal`] but a blank answer keeps `current`.
    pub fn read_decimal_or_keep(
        &mut self,
        prompt: &str,
        current: Decimal,
    ) -> Result<Decimal, LotError> {
        loop {
            let answer = self.ask(prompt)?;
            if answer.is_empty() {
                return Ok(current);
            }
            match parse_decimal(&answer) {
                Some(value) if value >= Decimal::ZERO => return Ok(value),
                _ => reject("Invalid value. Type a number like 5,50 or leave blank to keep."),
            }
        }
    }
}

impl NumericInput for ConsoleInput {
    fn read_decimal(&mut self, prompt: &str) -> Result<Decimal, LotError> {
        loop {
            let answer = self.ask(prompt)?;
            match parse_decimal(&answer) {
                Some(value) if value >= Decimal::ZERO => return Ok(value),
                _ => reject("Invalid value. Type a number like 5,50 or 5.50."),
            }
        }
    }
}

fn reject(message: &str) {
    failure(message);
    std::thread::sleep(std::time::Duration::from_millis(900));
}

/// Brazilian real formatting: `R$ 1.234,50`.
pub fn format_money(value: Decimal) -> String {
    let rounded = round_money(value);
    let text = rounded.abs().to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents}")
}

pub fn format_time(time: NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Hours without a trailing `.0` for whole values.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.2}")
    }
}

/// Plate and entry time of each parked vehicle.
pub fn write_parked(out: &mut impl Write, vehicles: &[ParkedVehicle]) -> io::Result<()> {
    writeln!(out, "{:<12}Entry", "Plate")?;
    writeln!(out, "{}", "-".repeat(35))?;
    for vehicle in vehicles {
        writeln!(out, "{:<12}{}", vehicle.plate, format_time(vehicle.entry_time))?;
    }
    Ok(())
}

/// One row per closed stay.
pub fn write_history(out: &mut impl Write, history: &[HistoryEntry]) -> io::Result<()> {
    writeln!(
        out,
        "{:<12}{:<20}{:<20}{:<8}Amount",
        "Plate", "Entry", "Exit", "Hours"
    )?;
    writeln!(out, "{}", "-".repeat(70))?;
    for entry in history {
        writeln!(
            out,
            "{:<12}{:<20}{:<20}{:<8}{}",
            entry.plate,
            format_time(entry.entry_time),
            format_time(entry.exit_time),
            format_hours(entry.hours_billed),
            format_money(entry.amount_charged)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Plate;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn money_uses_brazilian_separators() {
        assert_eq!(format_money(dec!(0)), "R$ 0,00");
        assert_eq!(format_money(dec!(5.5)), "R$ 5,50");
        assert_eq!(format_money(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_money(dec!(1234567.891)), "R$ 1.234.567,89");
        assert_eq!(format_money(dec!(-12)), "-R$ 12,00");
    }

    #[test]
    fn time_is_day_first() {
        assert_eq!(format_time(at(9, 5)), "03/02/2025 09:05");
    }

    #[test]
    fn hours_drop_trailing_zero() {
        assert_eq!(format_hours(2.0), "2");
        assert_eq!(format_hours(1.5), "1.50");
    }

    #[test]
    fn centre_pads_both_sides() {
        assert_eq!(centre("ab", 6), "  ab  ");
        assert_eq!(centre("abc", 6), " abc  ");
        assert_eq!(centre("too long", 4), "too long");
    }

    #[test]
    fn parked_table_lists_plates_in_order() {
        let vehicles = [
            ParkedVehicle {
                plate: Plate::parse("ABC1234").unwrap(),
                entry_time: at(8, 0),
            },
            ParkedVehicle {
                plate: Plate::parse("BRA2E19").unwrap(),
                entry_time: at(8, 30),
            },
        ];

        let mut out = Vec::new();
        write_parked(&mut out, &vehicles).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Plate       Entry");
        assert_eq!(lines[2], "ABC1234     03/02/2025 08:00");
        assert_eq!(lines[3], "BRA2E19     03/02/2025 08:30");
    }

    #[test]
    fn history_table_formats_amounts() {
        let history = [HistoryEntry {
            plate: Plate::parse("ABC1234").unwrap(),
            entry_time: at(8, 0),
            exit_time: at(11, 0),
            hours_billed: 3.0,
            amount_charged: dec!(11.00),
        }];

        let mut out = Vec::new();
        write_history(&mut out, &history).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.lines().nth(2).unwrap().ends_with("3       R$ 11,00"));
    }

    #[test]
    fn select_rejects_empty_menu() {
        let err = select(TITLE, &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn every_error_has_a_message() {
        for error in [
            LotError::InvalidPlate,
            LotError::AlreadyParked,
            LotError::NotParked,
            LotError::InvalidHours,
            LotError::InvalidPrice,
            LotError::InputClosed,
        ] {
            assert!(describe(&error).starts_with('✖'));
        }
    }
}
