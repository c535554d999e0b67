//! Entry point. Config -> Journal -> one command -> JSON on stdout.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use trading_journal::{
    calendar::{next_month, previous_month, DayNewsFilter},
    config::AppConfig,
    dates::resolve_date,
    plan::{is_plan_field, PLAN_FIELDS},
    state::{Journal, JournalStores},
    trades::{TradeInput, TradeQuery},
    types::Direction,
    weekly::categorize_events_by_day,
};

#[derive(Parser)]
#[command(name = "journal", version, about = "Trading journal: news calendar, trades, weekly plans")]
struct Cli {
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// Overrides `storage.dir` from the config.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import an economic-calendar CSV.
    ImportNews { csv: PathBuf },
    /// Import a broker trade export CSV.
    ImportTrades { csv: PathBuf },
    /// Filtered news grouped by week, with halving and per-day categories.
    Weeks {
        #[arg(long)]
        currency: Option<String>,
        /// Comma separated, e.g. `red,orange`.
        #[arg(long, value_delimiter = ',')]
        impact: Option<Vec<String>>,
    },
    /// Month calendar of trades.
    Month {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Trades and news for one date.
    Day {
        date: String,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        impact: Option<String>,
    },
    /// Aggregate trade statistics.
    Stats,
    /// List trades, newest first.
    Trades {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        direction: Option<Direction>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        profitable: bool,
    },
    /// Add a trade from JSON form data; with `--edit` the `id` in the JSON is updated.
    SaveTrade {
        json: String,
        #[arg(long)]
        edit: bool,
    },
    DeleteTrade { id: String },
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Wipe a stored collection.
    Clear {
        target: ClearTarget,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    Set {
        week: String,
        field: String,
        day: String,
        value: String,
    },
    /// One week's plan, or the list of planned weeks.
    Show { week: Option<String> },
    Clear { week: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ClearTarget {
    News,
    Trades,
    Plans,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_day(s: &str) -> anyhow::Result<chrono::NaiveDate> {
    resolve_date(s).with_context(|| format!("unreadable date: {s}"))
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli.config)?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => cfg.storage.data_dir()?,
    };
    info!(dir = %data_dir.display(), "using journal data");

    let mut journal = Journal::open(JournalStores::on_disk(&data_dir))
        .with_cycle_timeframe(&cfg.import.default_cycle_timeframe);
    let today = Local::now().date_naive();

    match cli.command {
        Command::ImportNews { csv } => {
            let text = fs::read_to_string(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let outcome = journal.import_news(&text)?;
            info!(
                "Imported {} news events. {} duplicates skipped.",
                outcome.imported.len(),
                outcome.duplicates
            );
            print_json(&json!({
                "imported": outcome.imported.len(),
                "duplicates": outcome.duplicates,
                "total": outcome.total,
            }))?;
        }
        Command::ImportTrades { csv } => {
            let text = fs::read_to_string(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let outcome = journal.import_trades(&text)?;
            info!(
                "Imported {} trades. {} duplicates skipped.",
                outcome.imported.len(),
                outcome.duplicates
            );
            print_json(&json!({
                "imported": outcome.imported.len(),
                "duplicates": outcome.duplicates,
                "total": outcome.total,
            }))?;
        }
        Command::Weeks { currency, impact } => {
            let mut filter = cfg.filters.to_filter();
            if let Some(c) = currency {
                filter.set_currency(&c);
            }
            if let Some(list) = impact {
                filter.select_all_impacts(list);
            }
            info!("{}", filter.summary());
            let weeks: Vec<_> = journal
                .weekly_data(&filter)
                .into_iter()
                .map(|w| {
                    let days = categorize_events_by_day(&w.data);
                    let assessments: Vec<_> = days.iter().map(|d| d.assessment()).collect();
                    json!({
                        "week": w.week,
                        "halving": w.halving,
                        "splitAfter": w.halving.split_after(),
                        "days": days,
                        "assessments": assessments,
                    })
                })
                .collect();
            print_json(&weeks)?;
        }
        Command::Month { year, month } => {
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            let Some(grid) = journal.month(year, month, today) else {
                bail!("invalid month {year}-{month}");
            };
            let (py, pm) = previous_month(year, month);
            let (ny, nm) = next_month(year, month);
            print_json(&json!({
                "grid": grid,
                "previous": format!("{py}-{pm:02}"),
                "next": format!("{ny}-{nm:02}"),
            }))?;
        }
        Command::Day {
            date,
            currency,
            impact,
        } => {
            let date = parse_day(&date)?;
            let mut news_filter = DayNewsFilter::default();
            if let Some(c) = currency {
                news_filter.currency = c;
            }
            if let Some(i) = impact {
                news_filter.impact = i;
            }
            print_json(&journal.day_view(date, &mut news_filter))?;
        }
        Command::Stats => print_json(&journal.stats())?,
        Command::Trades {
            symbol,
            direction,
            from,
            to,
            profitable,
        } => {
            let query = TradeQuery {
                symbol,
                direction,
                date_from: from,
                date_to: to,
                profitable_only: profitable,
            };
            let trades: Vec<_> = journal
                .sorted_trades()
                .into_iter()
                .filter(|t| query.matches(t))
                .collect();
            print_json(&trades)?;
        }
        Command::SaveTrade { json, edit } => {
            let input: TradeInput =
                serde_json::from_str(&json).context("trade JSON does not match the form fields")?;
            if edit && input.id.is_none() {
                bail!("--edit needs an \"id\" in the trade JSON");
            }
            let id = journal.save_trade(input, edit)?;
            print_json(&json!({ "id": id }))?;
        }
        Command::DeleteTrade { id } => {
            if !journal.delete_trade(&id)? {
                warn!(%id, "no trade with that id");
            }
        }
        Command::Plan(cmd) => match cmd {
            PlanCommand::Set {
                week,
                field,
                day,
                value,
            } => {
                if !is_plan_field(&field) {
                    let known: Vec<_> = PLAN_FIELDS.iter().map(|f| f.key).collect();
                    bail!("unknown plan field {field}; expected one of {}", known.join(", "));
                }
                let week = parse_day(&week)?.format("%Y-%m-%d").to_string();
                journal.update_plan(&week, &field, &day, &value)?;
                print_json(&journal.plans().export_week_plan(&week))?;
            }
            PlanCommand::Show { week: Some(week) } => {
                print_json(&journal.plans().export_week_plan(&week))?;
            }
            PlanCommand::Show { week: None } => {
                print_json(&journal.plans().planned_weeks())?;
            }
            PlanCommand::Clear { week } => {
                journal.clear_week_plan(&week)?;
            }
        },
        Command::Clear { target, yes } => {
            if !yes {
                bail!("refusing to clear without --yes");
            }
            match target {
                ClearTarget::News => journal.clear_news()?,
                ClearTarget::Trades => journal.clear_trades()?,
                ClearTarget::Plans => journal.clear_plans()?,
            }
        }
    }

    Ok(())
}
