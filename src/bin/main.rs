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

use carpark_rs::console::{self, ConsoleInput, TITLE};
use carpark_rs::{Engine, JsonFileStorage, LotError, Plate, SystemClock, report};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

/// Parking lot manager
///
/// Keeps track of parked vehicles, bills each stay on departure and saves
/// everything to a local JSON file after every change.
#[derive(Parser, Debug)]
#[command(name = "carpark")]
#[command(about = "An interactive parking lot manager", long_about = None)]
struct Args {
    /// Lot state file, created on first run
    #[arg(long, value_name = "FILE", default_value = "data.json")]
    data_file: PathBuf,

    /// Diagnostic log file (appended to)
    #[arg(long, value_name = "FILE", default_value = "carpark.log")]
    log_file: PathBuf,

    /// Diagnostic log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Write the departure history as CSV to FILE ("-" for stdout) and exit
    #[arg(long, value_name = "FILE")]
    export_history: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

const MENU: [&str; 6] = [
    "Park vehicle",
    "Remove vehicle",
    "List vehicles",
    "Show history",
    "Configure prices",
    "Quit",
];

type LotEngine = Engine<JsonFileStorage>;

fn main() {
    let args = Args::parse();
    init_logging(&args.log_file, args.log_level.into());

    let storage = JsonFileStorage::new(&args.data_file);

    if let Some(target) = &args.export_history {
        if let Err(e) = export_history(storage, target) {
            eprintln!("Error exporting history: {}", e);
            process::exit(1);
        }
        return;
    }

    if let Err(e) = run(storage) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Sends log records to `path` so they never draw over the menu.
fn init_logging(path: &Path, level: LevelFilter) {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            env_logger::Builder::new()
                .filter_level(level)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Logging disabled, cannot open '{}': {}", path.display(), e),
    }
}

fn export_history(storage: JsonFileStorage, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let engine = match Engine::restore(storage, SystemClock) {
        Ok(engine) => engine,
        Err((storage, _, e)) => {
            return Err(format!("cannot read '{}': {}", storage.path().display(), e).into());
        }
    };
    let history = engine.summarize().history;

    if target == Path::new("-") {
        report::write_history(history, io::stdout())?;
    } else {
        report::write_history(history, File::create(target)?)?;
    }
    Ok(())
}

fn run(storage: JsonFileStorage) -> Result<(), Box<dyn std::error::Error>> {
    let input = ConsoleInput::with_notice("No saved data found. Let's set up the prices.");
    let mut engine = Engine::initialize(storage, input)?;

    loop {
        let choice = console::select(TITLE, &MENU)?;
        match choice {
            0 => park(&mut engine)?,
            1 => remove(&mut engine)?,
            2 => list(&engine)?,
            3 => history(&engine)?,
            4 => configure_prices(&mut engine)?,
            _ => break,
        }

        println!("\nPress any key to continue...");
        console::wait_for_key()?;
    }

    console::success("\nGoodbye!");
    Ok(())
}

fn park(engine: &mut LotEngine) -> io::Result<()> {
    console::draw_header(&mut io::stdout(), TITLE)?;
    let Some(raw) = console::read_line("\nPlate to park: ")? else {
        return Ok(());
    };

    match engine.admit(&raw) {
        Ok(admission) => console::success(&format!(
            "✔ Vehicle {} parked at {}.",
            admission.plate,
            console::format_time(admission.entry_time)
        )),
        Err(e) => console::failure(console::describe(&e)),
    }
    Ok(())
}

fn remove(engine: &mut LotEngine) -> io::Result<()> {
    console::draw_header(&mut io::stdout(), TITLE)?;
    let Some(raw) = console::read_line("\nPlate to remove: ")? else {
        return Ok(());
    };

    // Look the vehicle up first so its entry time can be shown before
    // asking for an hour override.
    let entry_time = Plate::parse(&raw).and_then(|plate| {
        engine
            .parked()
            .iter()
            .find(|v| v.plate == plate)
            .map(|v| v.entry_time)
            .ok_or(LotError::NotParked)
    });
    let entry_time = match entry_time {
        Ok(time) => time,
        Err(e) => {
            console::failure(console::describe(&e));
            return Ok(());
        }
    };

    console::draw_header(&mut io::stdout(), TITLE)?;
    println!("Entry recorded at: {}", console::format_time(entry_time));
    let hours = console::read_line("Hours (Enter = calculate automatically): ")?;

    match engine.remove(&raw, hours.as_deref()) {
        Ok(departure) => {
            if departure.automatic {
                println!(
                    "🕒 Hours calculated automatically: {}h (actual: {:.2}h)",
                    console::format_hours(departure.entry.hours_billed),
                    departure.elapsed_hours
                );
            }
            console::notice(&format!("\n⚠ Vehicle {} removed.", departure.entry.plate));
            console::success(&format!(
                "Total due: {}",
                console::format_money(departure.entry.amount_charged)
            ));
        }
        Err(e) => console::failure(console::describe(&e)),
    }
    Ok(())
}

fn list(engine: &LotEngine) -> io::Result<()> {
    console::draw_header(&mut io::stdout(), TITLE)?;
    let vehicles = engine.parked();
    if vehicles.is_empty() {
        console::notice("No vehicles parked.");
        return Ok(());
    }

    console::heading("PARKED VEHICLES");
    console::write_parked(&mut io::stdout(), vehicles)
}

fn history(engine: &LotEngine) -> io::Result<()> {
    console::draw_header(&mut io::stdout(), TITLE)?;
    console::heading("DEPARTURE HISTORY");

    let summary = engine.summarize();
    if summary.history.is_empty() {
        console::notice("No departures recorded yet.");
    } else {
        console::write_history(&mut io::stdout(), summary.history)?;
    }

    println!("\nOccupied spaces: {}", summary.occupied);
    println!("Total revenue: {}", console::format_money(summary.total_revenue));
    Ok(())
}

fn configure_prices(engine: &mut LotEngine) -> Result<(), LotError> {
    let current = engine.pricing();
    let mut input = ConsoleInput::new();

    let initial = input.read_decimal_or_keep(
        &format!(
            "New initial fee (current {}, Enter to keep):",
            console::format_money(current.initial_fee())
        ),
        current.initial_fee(),
    )?;
    let hourly = input.read_decimal_or_keep(
        &format!(
            "New hourly fee (current {}, Enter to keep):",
            console::format_money(current.hourly_fee())
        ),
        current.hourly_fee(),
    )?;

    match engine.update_pricing(initial, hourly) {
        Ok(_) => console::success("\nPrices updated and saved."),
        Err(e) => console::failure(console::describe(&e)),
    }
    Ok(())
}
