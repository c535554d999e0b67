//! Manual trade entry, partial edits and list queries.

use serde::Deserialize;

use crate::types::{new_id, Direction, Trade};

pub const DEFAULT_CYCLE_TIMEFRAME: &str = "Weekly/Daily";

/// Trade fields as captured by the entry form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradeInput {
    /// Keep an existing id (edits); a new one is generated otherwise.
    pub id: Option<String>,
    pub trade_id: String,
    pub symbol: String,
    pub quantity: String,
    pub entry_date: String,
    pub entry_time: String,
    pub exit_date: String,
    pub exit_time: String,
    pub duration: String,
    pub entry_price: String,
    pub exit_price: String,
    pub pnl: String,
    pub commission: String,
    pub fees: String,
    pub direction: Option<Direction>,
    pub news_event: String,
    pub strategy: String,
    pub notes: String,
    pub cycle_timeframe: String,
}

impl TradeInput {
    /// Fields the form refuses to save without.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.entry_date.is_empty() {
            missing.push("Entry Date");
        }
        if self.entry_price.is_empty() {
            missing.push("Entry Price");
        }
        if self.quantity.is_empty() {
            missing.push("Quantity");
        }
        missing
    }

    pub fn into_trade(self) -> Trade {
        let cycle_timeframe = if self.cycle_timeframe.is_empty() {
            DEFAULT_CYCLE_TIMEFRAME.to_string()
        } else {
            self.cycle_timeframe
        };
        Trade {
            id: self.id.filter(|s| !s.is_empty()).unwrap_or_else(new_id),
            trade_id: self.trade_id,
            entry_date: self.entry_date,
            entry_time: self.entry_time,
            exit_date: self.exit_date,
            exit_time: self.exit_time,
            duration: self.duration,
            symbol: self.symbol,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            quantity: self.quantity,
            direction: Some(self.direction.unwrap_or(Direction::Long)),
            pnl: self.pnl,
            commission: self.commission,
            fees: self.fees,
            notes: self.notes,
            strategy: self.strategy,
            news_event: self.news_event,
            cycle_timeframe,
            extra: Default::default(),
        }
    }
}

/// Partial edit; `Some` fields overwrite, `None` fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradeUpdate {
    pub trade_id: Option<String>,
    pub symbol: Option<String>,
    pub quantity: Option<String>,
    pub entry_date: Option<String>,
    pub entry_time: Option<String>,
    pub exit_date: Option<String>,
    pub exit_time: Option<String>,
    pub duration: Option<String>,
    pub entry_price: Option<String>,
    pub exit_price: Option<String>,
    pub pnl: Option<String>,
    pub commission: Option<String>,
    pub fees: Option<String>,
    pub direction: Option<Direction>,
    pub news_event: Option<String>,
    pub strategy: Option<String>,
    pub notes: Option<String>,
    pub cycle_timeframe: Option<String>,
}

impl TradeUpdate {
    pub fn apply(self, trade: &mut Trade) {
        fn set(slot: &mut String, value: Option<String>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        set(&mut trade.trade_id, self.trade_id);
        set(&mut trade.symbol, self.symbol);
        set(&mut trade.quantity, self.quantity);
        set(&mut trade.entry_date, self.entry_date);
        set(&mut trade.entry_time, self.entry_time);
        set(&mut trade.exit_date, self.exit_date);
        set(&mut trade.exit_time, self.exit_time);
        set(&mut trade.duration, self.duration);
        set(&mut trade.entry_price, self.entry_price);
        set(&mut trade.exit_price, self.exit_price);
        set(&mut trade.pnl, self.pnl);
        set(&mut trade.commission, self.commission);
        set(&mut trade.fees, self.fees);
        set(&mut trade.news_event, self.news_event);
        set(&mut trade.strategy, self.strategy);
        set(&mut trade.notes, self.notes);
        set(&mut trade.cycle_timeframe, self.cycle_timeframe);
        if self.direction.is_some() {
            trade.direction = self.direction;
        }
    }
}

impl From<TradeInput> for TradeUpdate {
    fn from(i: TradeInput) -> Self {
        TradeUpdate {
            trade_id: Some(i.trade_id),
            symbol: Some(i.symbol),
            quantity: Some(i.quantity),
            entry_date: Some(i.entry_date),
            entry_time: Some(i.entry_time),
            exit_date: Some(i.exit_date),
            exit_time: Some(i.exit_time),
            duration: Some(i.duration),
            entry_price: Some(i.entry_price),
            exit_price: Some(i.exit_price),
            pnl: Some(i.pnl),
            commission: Some(i.commission),
            fees: Some(i.fees),
            direction: i.direction,
            news_event: Some(i.news_event),
            strategy: Some(i.strategy),
            notes: Some(i.notes),
            cycle_timeframe: Some(i.cycle_timeframe),
        }
    }
}

/// List filter for the trades table. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct TradeQuery {
    pub symbol: Option<String>,
    pub direction: Option<Direction>,
    /// Inclusive, compared as text against the entry date.
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub profitable_only: bool,
}

impl TradeQuery {
    pub fn matches(&self, t: &Trade) -> bool {
        if self.symbol.as_ref().is_some_and(|s| *s != t.symbol) {
            return false;
        }
        if self.direction.is_some() && t.direction != self.direction {
            return false;
        }
        if self
            .date_from
            .as_ref()
            .is_some_and(|from| t.entry_date.as_str() < from.as_str())
        {
            return false;
        }
        if self
            .date_to
            .as_ref()
            .is_some_and(|to| t.entry_date.as_str() > to.as_str())
        {
            return false;
        }
        !(self.profitable_only && t.pnl_value() <= 0.0)
    }

    pub fn apply<'a>(&self, trades: &'a [Trade]) -> Vec<&'a Trade> {
        trades.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Most recent entry date first; trades with unreadable dates go last.
pub fn sorted_trades(trades: &[Trade]) -> Vec<&Trade> {
    let mut out: Vec<&Trade> = trades.iter().collect();
    out.sort_by(|a, b| b.entry_day().cmp(&a.entry_day()));
    out
}
