use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{Datelike, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shiftbook_backend::config::Config;
use shiftbook_backend::models::shift::{BuiltinShift, ShiftCategory, ShiftId};
use shiftbook_backend::repositories::kv::{JsonFileStore, KeyValueStore};
use shiftbook_backend::services::alarm::{
    AlarmService, LogPresenter, RecordingAlarmService, TokioAlarmService,
};
use shiftbook_backend::services::reminder::ScheduleReport;
use shiftbook_backend::services::shift_book::ShiftBook;
use shiftbook_backend::utils::time::{today_local, SystemClock};

/// Shift planner with holiday-aware overtime and shift reminders
#[derive(Parser, Debug)]
#[command(name = "shiftbook")]
#[command(version, about, long_about = None)]
struct Args {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List holidays for a year, or for one month of it
    Holidays {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long)]
        month: Option<u32>,
    },
    /// Assign a shift to a date (YYYY-MM-DD)
    Assign { date: NaiveDate, shift: ShiftId },
    /// Remove the assignment of a date
    Clear { date: NaiveDate },
    /// Show assignment, holiday and expected hours of a date
    Show { date: Option<NaiveDate> },
    /// Monthly summary and report
    Month {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long)]
        month: Option<u32>,
    },
    /// Yearly summary
    Year {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Manage shift definitions
    Shifts {
        #[command(subcommand)]
        command: ShiftsCommand,
    },
    /// Write the schedule document to a file or stdout
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the schedule with a previously exported document
    Import { input: PathBuf },
    /// Configure shift reminders
    Reminders {
        #[command(subcommand)]
        command: RemindersCommand,
    },
    /// Arm every reminder and deliver them until interrupted
    Run,
}

#[derive(Subcommand, Debug)]
enum ShiftsCommand {
    /// List all shift definitions
    List,
    /// Add a custom shift
    Add {
        label: String,
        #[arg(value_parser = clap::value_parser!(u32).range(0..=24))]
        hours: u32,
        #[arg(short, long, default_value = "#9C27B0")]
        color: String,
        /// Mark the shift as leave; it zeroes expected hours
        #[arg(long)]
        leave: bool,
    },
    /// Remove a custom shift
    Remove { id: ShiftId },
    /// Change hours and label of a built-in shift
    Configure {
        #[arg(value_parser = parse_builtin)]
        kind: BuiltinShift,
        #[arg(value_parser = clap::value_parser!(u32).range(0..=24))]
        hours: u32,
        label: String,
    },
    /// Change the start time (HH:MM) of a custom shift
    Start {
        id: ShiftId,
        #[arg(value_parser = parse_time)]
        time: NaiveTime,
    },
}

#[derive(Subcommand, Debug)]
enum RemindersCommand {
    Enable,
    Disable,
    /// Set the lead times in days
    Lead {
        #[arg(required = true)]
        days: Vec<u32>,
    },
    /// Show the current reminder settings
    Status,
}

fn parse_builtin(value: &str) -> Result<BuiltinShift, String> {
    value
        .parse()
        .map_err(|_| format!("expected one of MORNING, NIGHT, FULL, got `{value}`"))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|err| err.to_string())
}

fn print_value<T: Serialize + std::fmt::Debug>(json: bool, value: &T) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value:#?}");
    }
    Ok(())
}

fn print_report(report: ScheduleReport) {
    println!(
        "reminders: {} armed, {} already past, {} failed",
        report.armed, report.skipped_past, report.failed
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiftbook_backend=info,shiftbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        time_zone = %config.time_zone,
        schedule_store = %config.schedule_store,
        "Loaded configuration from environment/.env"
    );

    let persistence: Arc<dyn KeyValueStore> = Arc::new(
        JsonFileStore::open(&config.data_dir)
            .with_context(|| format!("opening data directory {}", config.data_dir.display()))?,
    );
    // One-shot commands arm nothing that outlives the process; `run` re-arms on start.
    let alarms: Arc<dyn AlarmService> = match args.command {
        Command::Run => Arc::new(TokioAlarmService::new(Arc::new(LogPresenter))?),
        _ => Arc::new(RecordingAlarmService::new()),
    };
    let mut book = ShiftBook::open(
        persistence,
        alarms,
        Arc::new(SystemClock),
        config.time_zone,
        &config.schedule_store,
    );
    let today = today_local(&config.time_zone);

    match args.command {
        Command::Holidays { year, month } => {
            let year = year.unwrap_or(today.year());
            let holidays = match month {
                Some(month) => book.calendar().holidays_in_month(year, month),
                None => book.calendar().holidays_for_year(year),
            };
            if args.json {
                print_value(true, &holidays)?;
            } else {
                for holiday in holidays {
                    println!("{}  {:<11}  {}", holiday.date, holiday.kind.as_str(), holiday.name);
                }
            }
        }
        Command::Assign { date, shift } => {
            if !book.catalog().contains(&shift) {
                return Err(anyhow!("unknown shift `{shift}`"));
            }
            let outcome = book.assign(date, shift);
            println!("{date}: {}", book.catalog().label_of(&shift));
            if let Some(report) = outcome.reminders {
                print_report(report);
            }
            if !outcome.persisted {
                return Err(anyhow!("assignment kept in memory but could not be saved"));
            }
        }
        Command::Clear { date } => {
            let outcome = book.clear(date);
            match outcome.previous {
                Some(previous) => println!("{date}: cleared {}", book.catalog().label_of(&previous)),
                None => println!("{date}: nothing assigned"),
            }
        }
        Command::Show { date } => {
            let date = date.unwrap_or(today);
            let shift = book.schedule().get(date);
            println!(
                "{date}: {}",
                shift.map_or_else(|| "-".to_string(), |id| book.catalog().label_of(&id))
            );
            if let Some(holiday) = book.calendar().holiday(date) {
                println!("holiday: {} ({})", holiday.name, holiday.kind.as_str());
            }
            println!("expected hours: {}", book.expected_hours(date));
            if book.is_special_holiday_rule(date) {
                println!("reduced-hours day: shift hours are adjusted");
            }
        }
        Command::Month { year, month } => {
            let report = book.monthly_report(
                year.unwrap_or(today.year()),
                month.unwrap_or(today.month()),
            )?;
            print_value(args.json, &report)?;
        }
        Command::Year { year } => {
            let summary = book.yearly_summary(year.unwrap_or(today.year()))?;
            print_value(args.json, &summary)?;
        }
        Command::Shifts { command } => run_shifts(&mut book, command, args.json)?,
        Command::Export { output } => {
            let document = book.export()?;
            match output {
                Some(path) => std::fs::write(&path, document)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{document}"),
            }
        }
        Command::Import { input } => {
            let document = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let outcome = book.import(&document)?;
            println!(
                "imported {} assignments, skipped {}",
                outcome.imported, outcome.skipped
            );
        }
        Command::Reminders { command } => match command {
            RemindersCommand::Enable => print_report(book.set_reminders_enabled(true)),
            RemindersCommand::Disable => {
                book.set_reminders_enabled(false);
                println!("reminders disabled");
            }
            RemindersCommand::Lead { days } => print_report(book.set_lead_days(days)),
            RemindersCommand::Status => print_value(args.json, book.reminders().settings())?,
        },
        Command::Run => {
            let report = book.reschedule_all();
            print_report(report);
            tracing::info!("waiting for reminders, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            tracing::info!("shutting down");
        }
    }

    Ok(())
}

fn run_shifts(book: &mut ShiftBook, command: ShiftsCommand, json: bool) -> anyhow::Result<()> {
    match command {
        ShiftsCommand::List => {
            let definitions: Vec<_> = book.catalog().all_definitions().cloned().collect();
            if json {
                print_value(true, &definitions)?;
            } else {
                for def in definitions {
                    println!(
                        "{:<36}  {:<12}  {:>2}h  {}  {}",
                        def.id.to_string(),
                        def.label,
                        def.hours,
                        def.start_time.format("%H:%M"),
                        def.color
                    );
                }
            }
        }
        ShiftsCommand::Add {
            label,
            hours,
            color,
            leave,
        } => {
            let category = if leave {
                ShiftCategory::Leave
            } else {
                ShiftCategory::Work
            };
            let id = book.add_shift_with_category(label, hours, color, category);
            println!("{id}");
        }
        ShiftsCommand::Remove { id } => {
            if !book.remove_shift(&id) {
                return Err(anyhow!("`{id}` is not a removable custom shift"));
            }
        }
        ShiftsCommand::Configure { kind, hours, label } => {
            book.configure_builtin(kind, hours, label);
        }
        ShiftsCommand::Start { id, time } => {
            if !book.set_shift_start_time(&id, time) {
                return Err(anyhow!("`{id}` is not a custom shift"));
            }
        }
    }
    Ok(())
}
