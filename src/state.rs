//! The journal: in-memory collections plus the stores that persist them.
//!
//! Every mutation writes the touched collection back through its [`Store`].
//! Derived views (weekly grouping, stats, month grid) are recomputed from the
//! current collections on each call.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::calendar::{build_month, news_for_day, DayNewsFilter, MonthGrid};
use crate::dates::normalize_date;
use crate::filters::{filter_news, news_event_names, news_facets, Filter, NewsFacets};
use crate::import::{import_news_csv, import_trades_csv, ImportError};
use crate::plan::{DayValues, WeeklyPlans};
use crate::stats::{compute_stats, summarize_day, DaySummary, Stats};
use crate::store::{
    JsonFileStore, MemoryStore, Store, StoreError, NEWS_KEY, PLANS_KEY, TRADES_KEY,
};
use crate::trades::{sorted_trades, TradeInput, TradeQuery, TradeUpdate, DEFAULT_CYCLE_TIMEFRAME};
use crate::types::{new_id, ImportOutcome, NewsEvent, Trade};
use crate::weekly::{weekly_data, WeekBucket};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Please fill in required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("no record with id {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, JournalError>;

pub struct JournalStores {
    pub news: Box<dyn Store<Vec<NewsEvent>>>,
    pub trades: Box<dyn Store<Vec<Trade>>>,
    pub plans: Box<dyn Store<WeeklyPlans>>,
}

impl JournalStores {
    /// One JSON file per collection under `dir`.
    pub fn on_disk(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            news: Box::new(JsonFileStore::new(dir, NEWS_KEY)),
            trades: Box::new(JsonFileStore::new(dir, TRADES_KEY)),
            plans: Box::new(JsonFileStore::new(dir, PLANS_KEY)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            news: Box::new(MemoryStore::new(NEWS_KEY)),
            trades: Box::new(MemoryStore::new(TRADES_KEY)),
            plans: Box::new(MemoryStore::new(PLANS_KEY)),
        }
    }
}

/// Everything the day detail panel shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub summary: DaySummary,
    pub trades: Vec<Trade>,
    /// The day's news after the currency/impact selection.
    pub news: Vec<NewsEvent>,
    pub facets: NewsFacets,
    pub news_filter: DayNewsFilter,
}

pub struct Journal {
    news: Vec<NewsEvent>,
    trades: Vec<Trade>,
    plans: WeeklyPlans,
    stores: JournalStores,
    default_cycle_timeframe: String,
}

impl Journal {
    pub fn open(stores: JournalStores) -> Self {
        let news = stores.news.load();
        let trades = stores.trades.load();
        let plans = stores.plans.load();
        info!(
            news = news.len(),
            trades = trades.len(),
            planned_weeks = plans.planned_weeks().len(),
            "journal loaded"
        );
        Self {
            news,
            trades,
            plans,
            stores,
            default_cycle_timeframe: DEFAULT_CYCLE_TIMEFRAME.to_string(),
        }
    }

    /// Cycle timeframe stamped on imported trades.
    pub fn with_cycle_timeframe(mut self, timeframe: &str) -> Self {
        self.default_cycle_timeframe = timeframe.to_string();
        self
    }

    pub fn news(&self) -> &[NewsEvent] {
        &self.news
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn plans(&self) -> &WeeklyPlans {
        &self.plans
    }

    fn persist_news(&mut self) -> Result<()> {
        self.stores.news.save(&self.news)?;
        Ok(())
    }

    fn persist_trades(&mut self) -> Result<()> {
        self.stores.trades.save(&self.trades)?;
        Ok(())
    }

    fn persist_plans(&mut self) -> Result<()> {
        self.stores.plans.save(&self.plans)?;
        Ok(())
    }

    // ---------- news ----------

    pub fn import_news(&mut self, csv_text: &str) -> Result<ImportOutcome<NewsEvent>> {
        let outcome = import_news_csv(csv_text, &self.news)?;
        self.news.extend(outcome.imported.iter().cloned());
        self.persist_news()?;
        Ok(outcome)
    }

    /// Adds a manually entered event and returns its id.
    pub fn add_news(&mut self, mut event: NewsEvent) -> Result<String> {
        if event.id.is_empty() {
            event.id = new_id();
        }
        if event.date_iso.is_empty() {
            event.date_iso = normalize_date(&event.date);
        }
        let id = event.id.clone();
        self.news.push(event);
        self.persist_news()?;
        Ok(id)
    }

    pub fn update_news(&mut self, id: &str, edit: impl FnOnce(&mut NewsEvent)) -> Result<()> {
        let event = self
            .news
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;
        edit(event);
        event.id = id.to_string();
        self.persist_news()
    }

    pub fn delete_news(&mut self, id: &str) -> Result<bool> {
        let before = self.news.len();
        self.news.retain(|n| n.id != id);
        if self.news.len() == before {
            return Ok(false);
        }
        self.persist_news()?;
        Ok(true)
    }

    pub fn clear_news(&mut self) -> Result<()> {
        self.news.clear();
        self.stores.news.clear()?;
        info!("news cleared");
        Ok(())
    }

    // ---------- trades ----------

    pub fn import_trades(&mut self, csv_text: &str) -> Result<ImportOutcome<Trade>> {
        let outcome = import_trades_csv(csv_text, &self.trades, &self.default_cycle_timeframe)?;
        self.trades.extend(outcome.imported.iter().cloned());
        self.persist_trades()?;
        Ok(outcome)
    }

    /// Validates the form input and appends the trade. Returns its id.
    pub fn add_trade(&mut self, input: TradeInput) -> Result<String> {
        let missing = input.missing_required();
        if !missing.is_empty() {
            return Err(JournalError::MissingFields(missing));
        }
        let trade = input.into_trade();
        let id = trade.id.clone();
        self.trades.push(trade);
        self.persist_trades()?;
        Ok(id)
    }

    pub fn update_trade(&mut self, id: &str, update: TradeUpdate) -> Result<()> {
        let trade = self
            .trades
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;
        update.apply(trade);
        self.persist_trades()
    }

    /// Add, or overwrite the trade with `input.id` when `editing`.
    pub fn save_trade(&mut self, input: TradeInput, editing: bool) -> Result<String> {
        if !editing {
            return self.add_trade(input);
        }
        let missing = input.missing_required();
        if !missing.is_empty() {
            return Err(JournalError::MissingFields(missing));
        }
        let id = input.id.clone().unwrap_or_default();
        self.update_trade(&id, input.into())?;
        Ok(id)
    }

    pub fn delete_trade(&mut self, id: &str) -> Result<bool> {
        let before = self.trades.len();
        self.trades.retain(|t| t.id != id);
        if self.trades.len() == before {
            return Ok(false);
        }
        self.persist_trades()?;
        Ok(true)
    }

    pub fn clear_trades(&mut self) -> Result<()> {
        self.trades.clear();
        self.stores.trades.clear()?;
        info!("trades cleared");
        Ok(())
    }

    // ---------- plans ----------

    pub fn update_plan(&mut self, week: &str, field: &str, day: &str, value: &str) -> Result<()> {
        self.plans.update_plan(week, field, day, value);
        self.persist_plans()
    }

    pub fn update_week_plan(&mut self, week: &str, plan: BTreeMap<String, DayValues>) -> Result<()> {
        self.plans.update_week_plan(week, plan);
        self.persist_plans()
    }

    pub fn clear_week_plan(&mut self, week: &str) -> Result<()> {
        self.plans.clear_week_plan(week);
        self.persist_plans()
    }

    pub fn clear_plans(&mut self) -> Result<()> {
        self.plans.clear();
        self.stores.plans.clear()?;
        info!("plans cleared");
        Ok(())
    }

    // ---------- derived views ----------

    pub fn filtered_news(&self, filter: &Filter) -> Vec<NewsEvent> {
        filter_news(&self.news, filter)
    }

    pub fn weekly_data(&self, filter: &Filter) -> Vec<WeekBucket> {
        weekly_data(&self.news, filter)
    }

    pub fn news_facets(&self) -> NewsFacets {
        news_facets(&self.news)
    }

    pub fn news_event_names(&self) -> Vec<String> {
        news_event_names(&self.news)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.trades)
    }

    pub fn sorted_trades(&self) -> Vec<&Trade> {
        sorted_trades(&self.trades)
    }

    pub fn query_trades(&self, query: &TradeQuery) -> Vec<&Trade> {
        query.apply(&self.trades)
    }

    pub fn month(&self, year: i32, month: u32, today: NaiveDate) -> Option<MonthGrid> {
        build_month(&self.trades, year, month, today)
    }

    /// Trades and news for one date. `news_filter` is reconciled against the day's facets first.
    pub fn day_view(&self, date: NaiveDate, news_filter: &mut DayNewsFilter) -> DayView {
        let trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|t| t.entry_day() == Some(date))
            .cloned()
            .collect();
        let day_news = news_for_day(&self.news, date);
        let facets = news_filter.reconcile(&day_news);
        DayView {
            date,
            summary: summarize_day(&trades),
            news: news_filter.apply(&day_news),
            trades,
            facets,
            news_filter: news_filter.clone(),
        }
    }
}
