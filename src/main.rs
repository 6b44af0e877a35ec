// Entry point and high-level CLI flow.
//
// The terminal menu stands in for the dashboard UI:
// - Option [1] loads the three wide tables, printing diagnostics.
// - Options [2]..[5] are the four analysis views; each prompts for the
//   region selection and date range it needs, previews the resulting
//   tables, and exports them (CSV plus chart-spec JSON) for the renderer.
// - After a view, the user can go back to the menu or exit.
mod error;
mod loader;
mod output;
mod reports;
mod reshape;
mod transform;
mod types;
mod util;

use chrono::NaiveDate;
use loader::DataStore;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};
use tabled::Tabled;
use types::{Metric, Report};
use util::{format_int, parse_user_date};

const CONFIRMED_PATH: &str = "time_series_covid19_confirmed_global.csv";
const DEATHS_PATH: &str = "time_series_covid19_deaths_global.csv";
const RECOVERED_PATH: &str = "time_series_covid19_recovered_global.csv";

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the view selection menu.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to View Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// A date-range answer from the prompt.
///
/// `Incomplete` covers everything that is not zero or two valid endpoints;
/// the affected report section is skipped without an error.
enum PeriodInput {
    Full,
    Range(NaiveDate, NaiveDate),
    Incomplete,
}

fn prompt_period(store: &DataStore, label: &str) -> PeriodInput {
    if let Some((min, max)) = store.date_span() {
        println!("Available dates: {} to {}", min, max);
    }
    let input = read_line(&format!(
        "{} as YYYY-MM-DD YYYY-MM-DD (blank for the full span): ",
        label
    ));
    let tokens: Vec<&str> = input.split_whitespace().collect();
    match tokens.as_slice() {
        [] => PeriodInput::Full,
        [start, end] => match (parse_user_date(start), parse_user_date(end)) {
            (Some(start), Some(end)) => PeriodInput::Range(start, end),
            _ => PeriodInput::Incomplete,
        },
        _ => PeriodInput::Incomplete,
    }
}

/// Multi-select over the regions present in the data. Unknown names are
/// dropped with a note so a typo cannot silently shrink a chart.
fn prompt_regions(store: &DataStore) -> BTreeSet<String> {
    let available = store.regions();
    println!(
        "Available regions ({}): {}",
        format_int(available.len()),
        available.join(", ")
    );
    let input = read_line("Regions (comma-separated): ");
    let mut selection = BTreeSet::new();
    for name in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if available.iter().any(|r| r == name) {
            selection.insert(name.to_string());
        } else {
            println!("Unknown region {:?}, ignored.", name);
        }
    }
    selection
}

/// Preview a report and export its CSV/JSON pair.
fn show<T>(report: &Report<T>)
where
    T: Serialize + Tabled + Clone,
{
    println!("{}", report.spec.title);
    output::preview_table_rows(&report.rows, 5);
    if let Err(e) = output::export_report(report) {
        eprintln!("Write error: {}", e);
        return;
    }
    println!("(full table exported to {0}.csv and {0}.json)\n", report.name);
}

/// Handle option [1]: load and reshape the three metric tables.
fn handle_load(slot: &mut Option<DataStore>) {
    match DataStore::load(CONFIRMED_PATH, DEATHS_PATH, RECOVERED_PATH) {
        Ok((store, summaries)) => {
            for s in &summaries {
                let table = store.raw_table(s.metric);
                println!(
                    "{}: {} locations x {} dates ({} cells zero-filled, {} rows skipped)",
                    s.metric.label(),
                    format_int(table.rows.len()),
                    format_int(table.date_columns.len()),
                    format_int(s.zero_filled_cells),
                    format_int(s.skipped_rows)
                );
            }
            println!();
            *slot = Some(store);
        }
        Err(e) => {
            log::error!("load failed: {}", e);
            eprintln!("Failed to load data: {}\n", e);
        }
    }
}

/// View [2]: worldwide trend over full history, then a per-region
/// comparison for a chosen selection and period.
fn handle_worldwide(store: &DataStore) {
    show(&reports::global_trend(store, None));

    let selection = prompt_regions(store);
    if selection.is_empty() {
        println!("(no regions selected; comparison skipped)\n");
        return;
    }
    let period = match prompt_period(store, "Period") {
        PeriodInput::Full => None,
        PeriodInput::Range(start, end) => Some((start, end)),
        PeriodInput::Incomplete => {
            println!("(incomplete period; comparison skipped)\n");
            return;
        }
    };
    show(&reports::region_comparison(store, Some(&selection), period));
}

/// View [3]: recovered/confirmed/deaths totals per region.
fn handle_three_metric(store: &DataStore) {
    let selection = prompt_regions(store);
    if selection.is_empty() {
        println!("(no regions selected; nothing to display)\n");
        return;
    }
    let period = match prompt_period(store, "Period") {
        PeriodInput::Full => None,
        PeriodInput::Range(start, end) => Some((start, end)),
        PeriodInput::Incomplete => {
            println!("(incomplete period; nothing to display)\n");
            return;
        }
    };
    show(&reports::three_metric_comparison(store, Some(&selection), period));
}

/// View [4]: the worldwide trend over a chosen period, then per-region
/// confirmed and deaths series for an independently chosen selection and
/// period.
fn handle_temporal(store: &DataStore) {
    match prompt_period(store, "Trend period") {
        PeriodInput::Full => show(&reports::global_trend(store, None)),
        PeriodInput::Range(start, end) => {
            show(&reports::global_trend(store, Some((start, end))))
        }
        PeriodInput::Incomplete => println!("(incomplete period; trend skipped)\n"),
    }

    println!("Per-region trend comparison:");
    let selection = prompt_regions(store);
    if selection.is_empty() {
        println!("(no regions selected; comparison skipped)\n");
        return;
    }
    let period = match prompt_period(store, "Comparison period") {
        PeriodInput::Full => None,
        PeriodInput::Range(start, end) => Some((start, end)),
        PeriodInput::Incomplete => {
            println!("(incomplete period; comparison skipped)\n");
            return;
        }
    };
    show(&reports::region_trend(store, Metric::Confirmed, Some(&selection), period));
    show(&reports::region_trend(store, Metric::Deaths, Some(&selection), period));
}

/// View [5]: infection counts and mortality rate per (region, date).
fn handle_rates(store: &DataStore) {
    let selection = prompt_regions(store);
    if selection.is_empty() {
        println!("(no regions selected; nothing to display)\n");
        return;
    }
    let period = match prompt_period(store, "Period") {
        PeriodInput::Full => None,
        PeriodInput::Range(start, end) => Some((start, end)),
        PeriodInput::Incomplete => {
            println!("(incomplete period; nothing to display)\n");
            return;
        }
    };
    let (infection, mortality) = reports::mortality_analysis(store, Some(&selection), period);
    show(&infection);
    show(&mortality);
}

fn main() {
    pretty_env_logger::init();
    let mut store: Option<DataStore> = None;
    loop {
        println!("Select a view:");
        println!("[1] Load the data files");
        println!("[2] Worldwide cases and deaths");
        println!("[3] Recovered, confirmed and deaths by region");
        println!("[4] Temporal analysis");
        println!("[5] Infection and mortality rates\n");
        let choice = read_line("Enter choice: ");
        if choice == "1" {
            handle_load(&mut store);
            continue;
        }
        let Some(store) = store.as_ref() else {
            println!("Error: No data loaded. Please load the data files first (option 1).\n");
            continue;
        };
        match choice.as_str() {
            "2" => handle_worldwide(store),
            "3" => handle_three_metric(store),
            "4" => handle_temporal(store),
            "5" => handle_rates(store),
            _ => {
                println!("Invalid choice. Please enter 1 to 5.\n");
                continue;
            }
        }
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
}
