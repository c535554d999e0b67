//! CSV import for news calendars and broker trade exports.
//!
//! Both importers take the file text plus the current collection and return
//! only the rows not already present.

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dates::normalize_date;
use crate::types::{is_wire_field, new_id, ImportOutcome, NewsEvent, Trade};
use crate::utils::alnum_key;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file appears to be empty")]
    Empty,
    #[error(
        "No valid trades found. Please check your CSV format and ensure it has the required \
         columns: Trade ID, Symbol, Quantity, Entry Date, Entry Price, etc."
    )]
    NoValidTrades,
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),
}

fn read_rows(text: &str) -> Result<(Vec<String>, Vec<StringRecord>), ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::Empty);
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers = match records.next() {
        Some(first) => first?
            .iter()
            .map(|h| h.replace('"', "").trim().to_lowercase())
            .collect(),
        None => return Err(ImportError::Empty),
    };
    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(record);
    }
    Ok((headers, rows))
}

fn strip_quotes(v: &str) -> String {
    v.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Parse a news CSV and drop rows already present in `existing`.
///
/// Rows need both a date and an event name. `dateISO` is derived on the way in.
pub fn import_news_csv(
    text: &str,
    existing: &[NewsEvent],
) -> Result<ImportOutcome<NewsEvent>, ImportError> {
    let (headers, rows) = read_rows(text)?;

    let mut parsed = Vec::new();
    for row in rows {
        let mut event = NewsEvent {
            id: new_id(),
            ..Default::default()
        };
        for (i, header) in headers.iter().enumerate() {
            let value = strip_quotes(row.get(i).unwrap_or_default());
            match header.as_str() {
                "date" => event.date = value,
                "time" => event.time = value,
                "currency" => event.currency = value,
                "impact" => event.impact = value,
                "event" => event.event = value,
                "day" => event.day = value,
                "forecast" => event.forecast = value,
                "previous" => event.previous = value,
                "actual" => event.actual = value,
                other => debug!(column = other, "ignoring news column"),
            }
        }
        if event.date.is_empty() || event.event.is_empty() {
            continue;
        }
        event.date_iso = normalize_date(&event.date);
        parsed.push(event);
    }

    let existing_keys: HashSet<String> = existing.iter().map(NewsEvent::dedup_key).collect();
    let outcome = dedup(parsed, |e| existing_keys.contains(&e.dedup_key()));
    info!(
        imported = outcome.imported.len(),
        duplicates = outcome.duplicates,
        total = outcome.total,
        "news import parsed"
    );
    Ok(outcome)
}

/// Apply one CSV column to a trade.
///
/// Headers are matched on their alphanumeric key, so the stored field names
/// (`date`, `asset`, `entry`, `exit`, `size`, `pnl`) land on the same fields as
/// the broker headers. Other unknown headers go to `extra`.
fn map_trade_field(trade: &mut Trade, header: &str, value: String) {
    match alnum_key(header).as_str() {
        "tradeid" => trade.trade_id = value,
        "symbol" | "asset" => trade.symbol = value,
        "quantity" | "size" => trade.quantity = value,
        "entrydate" | "date" => trade.entry_date = normalize_date(&value),
        "entrytime" => trade.entry_time = value,
        "exitdate" => trade.exit_date = normalize_date(&value),
        "exittime" => trade.exit_time = value,
        "duration" => trade.duration = value,
        "entryprice" | "entry" => trade.entry_price = value,
        "exitprice" | "exit" => trade.exit_price = value,
        "pl" | "pnl" => trade.pnl = value,
        "commission" => trade.commission = value,
        "fees" => trade.fees = value,
        "strategy" => trade.strategy = value,
        "notes" => trade.notes = value,
        "newsevent" => trade.news_event = value,
        "cycletimeframe" => trade.cycle_timeframe = value,
        "direction" => match value.parse() {
            Ok(d) => trade.direction = Some(d),
            Err(_) if value.is_empty() => {}
            Err(e) => warn!("{e}"),
        },
        "" => {}
        key if is_wire_field(key) => {
            warn!(column = header, "column clashes with a stored trade field, ignored");
        }
        key => {
            trade.extra.insert(key.to_string(), value);
        }
    }
}

/// Parse a broker trade export and drop trades already present in `existing`.
///
/// Rows whose column count differs from the header, or that lack entry date,
/// symbol, entry price or quantity, are skipped. No valid row at all is an error.
pub fn import_trades_csv(
    text: &str,
    existing: &[Trade],
    default_cycle_timeframe: &str,
) -> Result<ImportOutcome<Trade>, ImportError> {
    let (headers, rows) = read_rows(text)?;

    let mut parsed = Vec::new();
    for (line, row) in rows.iter().enumerate() {
        if row.len() != headers.len() {
            warn!(
                "Line {}: Expected {} columns, got {}",
                line + 1,
                headers.len(),
                row.len()
            );
            continue;
        }

        let mut trade = Trade {
            id: new_id(),
            cycle_timeframe: default_cycle_timeframe.to_string(),
            ..Default::default()
        };
        for (header, value) in headers.iter().zip(row.iter()) {
            map_trade_field(&mut trade, header, strip_quotes(value));
        }

        if trade.entry_date.is_empty()
            || trade.symbol.is_empty()
            || trade.entry_price.is_empty()
            || trade.quantity.is_empty()
        {
            debug!(line = line + 1, "skipping trade row missing required fields");
            continue;
        }
        parsed.push(trade);
    }

    if parsed.is_empty() {
        return Err(ImportError::NoValidTrades);
    }

    let existing_keys: HashSet<String> = existing.iter().map(Trade::dedup_key).collect();
    let outcome = dedup(parsed, |t| existing_keys.contains(&t.dedup_key()));
    info!(
        imported = outcome.imported.len(),
        duplicates = outcome.duplicates,
        total = outcome.total,
        "trade import parsed"
    );
    Ok(outcome)
}

fn dedup<T>(parsed: Vec<T>, is_known: impl Fn(&T) -> bool) -> ImportOutcome<T> {
    let total = parsed.len();
    let imported: Vec<T> = parsed.into_iter().filter(|r| !is_known(r)).collect();
    ImportOutcome {
        duplicates: total - imported.len(),
        imported,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    const NEWS_CSV: &str = "\
date,time,currency,impact,event,day,forecast,previous,actual
05/03/2025,8:30am,USD,red,PPI m/m,Wed,0.3%,0.4%,
\"06/03/2025\",8:30am,USD,red,\"Unemployment Claims, Weekly\",Thu,,,
07/03/2025,,EUR,orange,,Fri,,,

July 8 2025,10:00am,USD,yellow,Crude Oil Inventories,Tue,,,
";

    const TRADES_CSV: &str = "\
Trade ID,Symbol,Quantity,Entry Date,Entry Time,Entry Price,Exit Price,P&L,Commission,Fees,Direction,Strategy,Setup Grade
T1,ES,1,05/03/2025,09:31,5800.25,5810.25,500,4.5,1.2,long,ORB,A
T2,NQ,2,2025-03-06,10:02,20100,20050,-1000,9,2.4,SHORT,,B
T3,ES,1,,09:40,5790,5795,250,4.5,1.2,LONG,,C
T4,ES,1,07/03/2025,09:45,5805
";

    // ---------- news ----------

    #[test]
    fn news_rows_are_mapped_and_dated() {
        let out = import_news_csv(NEWS_CSV, &[]).unwrap();
        assert_eq!(out.total, 3);
        assert_eq!(out.duplicates, 0);

        let first = &out.imported[0];
        assert_eq!(first.date, "05/03/2025");
        assert_eq!(first.date_iso, "2025-03-05");
        assert_eq!(first.currency, "USD");
        assert_eq!(first.impact, "red");
        assert_eq!(first.day, "Wed");
        assert_eq!(first.forecast, "0.3%");
        assert!(!first.id.is_empty());

        assert_eq!(out.imported[1].event, "Unemployment Claims, Weekly");
        assert_eq!(out.imported[2].date_iso, "2025-07-08");
    }

    #[test]
    fn duplicate_news_is_reported_not_imported() {
        let first = import_news_csv(NEWS_CSV, &[]).unwrap();
        let again = import_news_csv(NEWS_CSV, &first.imported).unwrap();
        assert_eq!(again.duplicates, 3);
        assert!(again.imported.is_empty());

        let single = "date,time,currency,impact,event\n05/03/2025,8:30am,USD,red,PPI m/m\n";
        let existing = vec![NewsEvent {
            date: "05/03/2025".into(),
            time: "8:30am".into(),
            currency: "USD".into(),
            event: "PPI m/m".into(),
            ..Default::default()
        }];
        let out = import_news_csv(single, &existing).unwrap();
        assert_eq!(out.duplicates, 1);
        assert!(out.imported.is_empty());
    }

    #[test]
    fn headers_are_case_insensitive() {
        let csv = "Date,Event,Impact\n2025-03-05,GDP,orange\n";
        let out = import_news_csv(csv, &[]).unwrap();
        assert_eq!(out.imported[0].event, "GDP");
        assert_eq!(out.imported[0].impact, "orange");
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(import_news_csv("", &[]), Err(ImportError::Empty)));
        assert!(matches!(
            import_trades_csv("  \n\n", &[], "Weekly/Daily"),
            Err(ImportError::Empty)
        ));
    }

    // ---------- trades ----------

    #[test]
    fn trade_rows_are_mapped() {
        let out = import_trades_csv(TRADES_CSV, &[], "Weekly/Daily").unwrap();
        assert_eq!(out.total, 2);

        let t1 = &out.imported[0];
        assert_eq!(t1.trade_id, "T1");
        assert_eq!(t1.symbol, "ES");
        assert_eq!(t1.entry_date, "2025-03-05");
        assert_eq!(t1.entry_price, "5800.25");
        assert_eq!(t1.pnl_value(), 500.0);
        assert_eq!(t1.commission_value(), 4.5);
        assert_eq!(t1.direction, Some(Direction::Long));
        assert_eq!(t1.strategy, "ORB");
        assert_eq!(t1.cycle_timeframe, "Weekly/Daily");
        assert_eq!(t1.extra.get("setupgrade").map(String::as_str), Some("A"));

        let t2 = &out.imported[1];
        assert_eq!(t2.direction, Some(Direction::Short));
        assert_eq!(t2.quantity, "2");
    }

    #[test]
    fn duplicate_trades_use_date_symbol_price() {
        let existing = vec![Trade {
            entry_date: "2025-03-05".into(),
            symbol: "ES".into(),
            entry_price: "5800.25".into(),
            ..Default::default()
        }];
        let out = import_trades_csv(TRADES_CSV, &existing, "Weekly/Daily").unwrap();
        assert_eq!(out.total, 2);
        assert_eq!(out.duplicates, 1);
        assert_eq!(out.imported.len(), 1);
        assert_eq!(out.imported[0].symbol, "NQ");
    }

    #[test]
    fn stored_field_names_map_to_their_fields() {
        let csv = "\
ID,Date,Asset,Entry,Exit,Size,PnL,News Event
x9,05/03/2025,ES,5800,5810,2,500,CPI m/m
";
        let out = import_trades_csv(csv, &[], "Weekly/Daily").unwrap();
        let t = &out.imported[0];
        assert_eq!(t.entry_date, "2025-03-05");
        assert_eq!(t.symbol, "ES");
        assert_eq!(t.entry_price, "5800");
        assert_eq!(t.exit_price, "5810");
        assert_eq!(t.quantity, "2");
        assert_eq!(t.pnl_value(), 500.0);
        assert_eq!(t.news_event, "CPI m/m");
        assert_ne!(t.id, "x9");
        assert!(t.extra.is_empty());

        let v = serde_json::to_string(t).unwrap();
        let back: Trade = serde_json::from_str(&v).unwrap();
        assert_eq!(&back, t);
    }

    #[test]
    fn no_valid_trades_is_an_error() {
        let csv = "Symbol,Entry Date\nES,2025-03-05\n";
        assert!(matches!(
            import_trades_csv(csv, &[], "Weekly/Daily"),
            Err(ImportError::NoValidTrades)
        ));
    }
}
