//! Core domain types for news events, trades and import results.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::resolve_date;
use crate::utils::{first_non_empty, parse_amount};

/// Sentinel meaning "no restriction" for currency/impact selectors.
pub const ALL: &str = "ALL";

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An economic-calendar entry. Immutable once imported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsEvent {
    #[serde(default = "new_id", deserialize_with = "id_text")]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "dateISO")]
    pub date_iso: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub currency: String,
    /// `red | orange | yellow | gray` in practice, free-form in the data.
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub event: String,
    /// Weekday as written by the data source; may disagree with `date_iso`.
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub forecast: String,
    #[serde(default)]
    pub previous: String,
    #[serde(default)]
    pub actual: String,
}

impl NewsEvent {
    pub fn dedup_key(&self) -> String {
        format!("{}-{}-{}-{}", self.date, self.time, self.currency, self.event)
    }

    /// Calendar date from `date_iso`, falling back to the raw `date`.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let raw = first_non_empty(&[Some(self.date_iso.as_str()), Some(self.date.as_str())]);
        resolve_date(&raw)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            "BUY" => Ok(Direction::Buy),
            "SELL" => Ok(Direction::Sell),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// A recorded execution. Numeric fields stay as entered and are coerced on read.
///
/// Serialized through [`TradeRecord`], which also reads and writes the legacy
/// field names (`date`, `asset`, `entry`, `exit`, `size`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TradeRecord", into = "TradeRecord")]
pub struct Trade {
    pub id: String,
    /// Broker-side identifier, if any.
    pub trade_id: String,
    pub entry_date: String,
    pub entry_time: String,
    pub exit_date: String,
    pub exit_time: String,
    pub duration: String,
    pub symbol: String,
    pub entry_price: String,
    pub exit_price: String,
    pub quantity: String,
    pub direction: Option<Direction>,
    pub pnl: String,
    pub commission: String,
    pub fees: String,
    pub notes: String,
    pub strategy: String,
    pub news_event: String,
    pub cycle_timeframe: String,
    /// Unmapped import columns, keyed by their alphanumeric header.
    pub extra: BTreeMap<String, String>,
}

impl Trade {
    pub fn pnl_value(&self) -> f64 {
        parse_amount(&self.pnl)
    }

    pub fn commission_value(&self) -> f64 {
        parse_amount(&self.commission)
    }

    pub fn fees_value(&self) -> f64 {
        parse_amount(&self.fees)
    }

    pub fn entry_day(&self) -> Option<NaiveDate> {
        resolve_date(&self.entry_date)
    }

    pub fn dedup_key(&self) -> String {
        format!("{}-{}-{}", self.entry_date, self.symbol, self.entry_price)
    }
}

/// Field names a stored trade uses, legacy aliases included.
const WIRE_FIELDS: &[&str] = &[
    "id",
    "tradeId",
    "entryDate",
    "date",
    "entryTime",
    "exitDate",
    "exitTime",
    "duration",
    "symbol",
    "asset",
    "entryPrice",
    "entry",
    "exitPrice",
    "exit",
    "quantity",
    "size",
    "direction",
    "pnl",
    "commission",
    "fees",
    "notes",
    "strategy",
    "newsEvent",
    "cycleTimeframe",
];

/// Whether `key` names a stored trade field (ASCII case-insensitive).
pub fn is_wire_field(key: &str) -> bool {
    WIRE_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(key))
}

/// Wire shape of a stored trade, tolerant of both field generations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    trade_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    entry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    entry_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    exit_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    exit_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    asset: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    entry_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    entry: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    exit_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    exit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    size: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    direction: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pnl: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    commission: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    fees: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    strategy: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    news_event: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    cycle_timeframe: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl From<TradeRecord> for Trade {
    fn from(r: TradeRecord) -> Self {
        let text = |v: Option<String>| v.unwrap_or_default();
        let id = r.id.filter(|s| !s.is_empty()).unwrap_or_else(new_id);
        Trade {
            id,
            trade_id: text(r.trade_id),
            entry_date: first_non_empty(&[r.entry_date.as_deref(), r.date.as_deref()]),
            entry_time: text(r.entry_time),
            exit_date: text(r.exit_date),
            exit_time: text(r.exit_time),
            duration: text(r.duration),
            symbol: first_non_empty(&[r.symbol.as_deref(), r.asset.as_deref()]),
            entry_price: first_non_empty(&[r.entry_price.as_deref(), r.entry.as_deref()]),
            exit_price: first_non_empty(&[r.exit_price.as_deref(), r.exit.as_deref()]),
            quantity: first_non_empty(&[r.quantity.as_deref(), r.size.as_deref()]),
            direction: r.direction.and_then(|d| d.parse().ok()),
            pnl: text(r.pnl),
            commission: text(r.commission),
            fees: text(r.fees),
            notes: text(r.notes),
            strategy: text(r.strategy),
            news_event: text(r.news_event),
            cycle_timeframe: text(r.cycle_timeframe),
            extra: r
                .extra
                .into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect(),
        }
    }
}

impl From<Trade> for TradeRecord {
    fn from(t: Trade) -> Self {
        TradeRecord {
            id: Some(t.id),
            trade_id: Some(t.trade_id),
            date: Some(t.entry_date.clone()),
            entry_date: Some(t.entry_date),
            entry_time: Some(t.entry_time),
            exit_date: Some(t.exit_date),
            exit_time: Some(t.exit_time),
            duration: Some(t.duration),
            asset: Some(t.symbol.clone()),
            symbol: Some(t.symbol),
            entry: Some(t.entry_price.clone()),
            entry_price: Some(t.entry_price),
            exit: Some(t.exit_price.clone()),
            exit_price: Some(t.exit_price),
            size: Some(t.quantity.clone()),
            quantity: Some(t.quantity),
            direction: Some(t.direction.map(|d| d.as_str().to_string()).unwrap_or_default()),
            pnl: Some(t.pnl),
            commission: Some(t.commission),
            fees: Some(t.fees),
            notes: Some(t.notes),
            strategy: Some(t.strategy),
            news_event: Some(t.news_event),
            cycle_timeframe: Some(t.cycle_timeframe),
            extra: t
                .extra
                .into_iter()
                .filter(|(k, _)| !is_wire_field(k))
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect(),
        }
    }
}

/// Scalars older stores wrote as numbers (ids, prices) read back as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(d)?.map(Scalar::into_text))
}

fn id_text<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(d)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(new_id))
}

/// Result of merging an imported batch into an existing collection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportOutcome<T> {
    /// Records not already present, in file order.
    pub imported: Vec<T>,
    pub duplicates: usize,
    /// Valid rows read from the file, duplicates included.
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ---------- NewsEvent ----------

    #[test]
    fn news_dedup_key_uses_empty_for_missing_fields() {
        let n = NewsEvent {
            date: "05/03/2025".into(),
            event: "CPI m/m".into(),
            ..Default::default()
        };
        assert_eq!(n.dedup_key(), "05/03/2025---CPI m/m");
    }

    #[test]
    fn news_loads_legacy_numeric_id_and_missing_fields() {
        let n: NewsEvent =
            serde_json::from_value(json!({"id": 1719830400000u64, "date": "2025-07-01"})).unwrap();
        assert_eq!(n.id, "1719830400000");
        assert_eq!(n.currency, "");

        let fresh: NewsEvent = serde_json::from_value(json!({"date": "2025-07-01"})).unwrap();
        assert!(!fresh.id.is_empty());
    }

    #[test]
    fn news_calendar_date_prefers_iso() {
        let n = NewsEvent {
            date: "July 1 2025".into(),
            date_iso: "2025-07-02".into(),
            ..Default::default()
        };
        assert_eq!(n.calendar_date(), NaiveDate::from_ymd_opt(2025, 7, 2));

        let raw_only = NewsEvent {
            date: "01/07/2025".into(),
            ..Default::default()
        };
        assert_eq!(raw_only.calendar_date(), NaiveDate::from_ymd_opt(2025, 7, 1));
    }

    // ---------- Trade aliases ----------

    #[test]
    fn legacy_trade_fields_collapse_into_canonical() {
        let t: Trade = serde_json::from_value(json!({
            "id": 42.5,
            "date": "2025-03-05",
            "asset": "EURUSD",
            "entry": "1.0850",
            "size": 2,
            "pnl": 120,
            "direction": "long"
        }))
        .unwrap();
        assert_eq!(t.id, "42.5");
        assert_eq!(t.entry_date, "2025-03-05");
        assert_eq!(t.symbol, "EURUSD");
        assert_eq!(t.entry_price, "1.0850");
        assert_eq!(t.quantity, "2");
        assert_eq!(t.pnl_value(), 120.0);
        assert_eq!(t.direction, Some(Direction::Long));
    }

    #[test]
    fn canonical_fields_win_over_legacy() {
        let t: Trade = serde_json::from_value(json!({
            "entryDate": "2025-03-06",
            "date": "2025-03-05",
            "symbol": "NQ",
            "asset": "ES"
        }))
        .unwrap();
        assert_eq!(t.entry_date, "2025-03-06");
        assert_eq!(t.symbol, "NQ");
    }

    #[test]
    fn serialized_trade_keeps_legacy_names_in_sync() {
        let t = Trade {
            id: "t1".into(),
            entry_date: "2025-03-05".into(),
            symbol: "GBPUSD".into(),
            entry_price: "1.27".into(),
            quantity: "1".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["entryDate"], "2025-03-05");
        assert_eq!(v["date"], "2025-03-05");
        assert_eq!(v["asset"], "GBPUSD");
        assert_eq!(v["entry"], "1.27");
        assert_eq!(v["size"], "1");

        let back: Trade = serde_json::from_value(v).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn unknown_trade_fields_are_kept() {
        let t: Trade = serde_json::from_value(json!({"symbol": "ES", "setup": "A+"})).unwrap();
        assert_eq!(t.extra.get("setup").map(String::as_str), Some("A+"));
    }

    #[test]
    fn unknown_direction_is_dropped() {
        let t: Trade = serde_json::from_value(json!({"direction": "SIDEWAYS"})).unwrap();
        assert_eq!(t.direction, None);
        assert_eq!("sell".parse::<Direction>(), Ok(Direction::Sell));
    }

    #[test]
    fn extra_never_shadows_stored_fields() {
        let mut t = Trade {
            id: "t1".into(),
            pnl: "500".into(),
            ..Default::default()
        };
        t.extra.insert("pnl".into(), "999".into());
        t.extra.insert("ID".into(), "x".into());
        t.extra.insert("setup".into(), "A".into());

        let text = serde_json::to_string(&t).unwrap();
        let back: Trade = serde_json::from_str(&text).unwrap();
        assert_eq!(back.id, "t1");
        assert_eq!(back.pnl, "500");
        assert_eq!(back.extra.len(), 1);
        assert_eq!(back.extra.get("setup").map(String::as_str), Some("A"));
    }

    #[test]
    fn missing_direction_is_stored_as_empty_text() {
        let t = Trade::default();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["direction"], "");
        let back: Trade = serde_json::from_value(v).unwrap();
        assert_eq!(back.direction, None);
    }

    #[test]
    fn trade_dedup_key_and_amounts() {
        let t = Trade {
            entry_date: "2025-03-05".into(),
            symbol: "ES".into(),
            pnl: "abc".into(),
            fees: "2.5".into(),
            ..Default::default()
        };
        assert_eq!(t.dedup_key(), "2025-03-05-ES-");
        assert_eq!(t.pnl_value(), 0.0);
        assert_eq!(t.fees_value(), 2.5);
        assert_eq!(t.commission_value(), 0.0);
    }
}
