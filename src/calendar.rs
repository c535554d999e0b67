//! Month grid for the trades calendar: day cells, weekly rollups and the monthly total.
//!
//! The grid always covers six Sunday-first weeks. Trade dates go through
//! [`resolve_date`] so every cell, row and total agrees on the same parsing.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::dates::resolve_date;
use crate::filters::{news_facets, NewsFacets};
use crate::types::{NewsEvent, Trade, ALL};

pub const GRID_WEEKS: usize = 6;
/// Rows with at least this many in-month days are numbered and shown.
pub const PRIMARY_WEEK_MIN_DAYS: usize = 4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_number: u32,
    pub is_current_month: bool,
    pub is_today: bool,
    pub trades: Vec<Trade>,
    pub trade_count: usize,
    pub daily_pnl: f64,
}

impl CalendarDay {
    pub fn is_selected(&self, selected: Option<NaiveDate>) -> bool {
        selected == Some(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    /// Row position in the grid, 1-based; renumbered for primary weeks.
    pub week_number: usize,
    /// Grid row this summary describes, 0-based.
    pub row_index: usize,
    pub trade_count: usize,
    pub week_pnl: f64,
    pub current_month_days: usize,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<CalendarDay>>,
    /// One summary per grid row, numbered by row.
    pub all_week_summaries: Vec<WeekSummary>,
    /// Primary rows only, numbered 1..N.
    pub week_summaries: Vec<WeekSummary>,
    pub monthly_pnl: f64,
}

impl MonthGrid {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days().find(|d| d.date == date)
    }

    pub fn grid_start(&self) -> Option<NaiveDate> {
        self.weeks.first().and_then(|w| w.first()).map(|d| d.date)
    }
}

/// Sunday on or before the first of the month.
pub fn grid_start(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_sub_signed(Duration::days(i64::from(first.weekday().num_days_from_sunday())))
}

/// Build the six-week grid for `month` (1-12). `None` for an invalid year/month.
pub fn build_month(trades: &[Trade], year: i32, month: u32, today: NaiveDate) -> Option<MonthGrid> {
    let start = grid_start(year, month)?;
    let dated: Vec<(Option<NaiveDate>, &Trade)> =
        trades.iter().map(|t| (t.entry_day(), t)).collect();

    let mut weeks = Vec::with_capacity(GRID_WEEKS);
    for week in 0..GRID_WEEKS {
        let mut row = Vec::with_capacity(7);
        for weekday in 0..7 {
            let offset = (week * 7 + weekday) as i64;
            let cursor = start.checked_add_signed(Duration::days(offset))?;
            let day_trades: Vec<Trade> = dated
                .iter()
                .filter(|(d, _)| *d == Some(cursor))
                .map(|(_, t)| (*t).clone())
                .collect();
            let daily_pnl = day_trades.iter().map(Trade::pnl_value).sum();
            row.push(CalendarDay {
                date: cursor,
                day_number: cursor.day(),
                is_current_month: cursor.month() == month && cursor.year() == year,
                is_today: cursor == today,
                trade_count: day_trades.len(),
                trades: day_trades,
                daily_pnl,
            });
        }
        weeks.push(row);
    }

    let all_week_summaries: Vec<WeekSummary> = weeks
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let current_month_days = row.iter().filter(|d| d.is_current_month).count();
            WeekSummary {
                week_number: i + 1,
                row_index: i,
                trade_count: row.iter().map(|d| d.trade_count).sum(),
                week_pnl: row.iter().map(|d| d.daily_pnl).sum(),
                current_month_days,
                is_primary: current_month_days >= PRIMARY_WEEK_MIN_DAYS,
            }
        })
        .collect();

    let week_summaries = all_week_summaries
        .iter()
        .filter(|w| w.is_primary)
        .enumerate()
        .map(|(n, w)| WeekSummary {
            week_number: n + 1,
            ..w.clone()
        })
        .collect();

    let monthly_pnl = dated
        .iter()
        .filter(|(d, _)| d.is_some_and(|d| d.year() == year && d.month() == month))
        .map(|(_, t)| t.pnl_value())
        .sum();

    Some(MonthGrid {
        year,
        month,
        weeks,
        all_week_summaries,
        week_summaries,
        monthly_pnl,
    })
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// News events whose resolved date equals `date`.
pub fn news_for_day(news: &[NewsEvent], date: NaiveDate) -> Vec<NewsEvent> {
    news.iter()
        .filter(|n| n.calendar_date() == Some(date))
        .cloned()
        .collect()
}

/// Single-choice currency/impact selector used in the day detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayNewsFilter {
    pub currency: String,
    pub impact: String,
}

impl Default for DayNewsFilter {
    fn default() -> Self {
        Self {
            currency: ALL.to_string(),
            impact: ALL.to_string(),
        }
    }
}

impl DayNewsFilter {
    pub fn apply(&self, day_news: &[NewsEvent]) -> Vec<NewsEvent> {
        day_news
            .iter()
            .filter(|n| self.currency == ALL || n.currency == self.currency)
            .filter(|n| self.impact == ALL || n.impact == self.impact)
            .cloned()
            .collect()
    }

    /// Reset selections that no longer exist among the day's events.
    /// Returns the facets it checked against.
    pub fn reconcile(&mut self, day_news: &[NewsEvent]) -> NewsFacets {
        let facets = news_facets(day_news);
        if day_news.is_empty() {
            return facets;
        }
        if self.currency != ALL && !facets.currencies.contains(&self.currency) {
            self.currency = ALL.to_string();
        }
        if self.impact != ALL && !facets.impacts.contains(&self.impact) {
            self.impact = ALL.to_string();
        }
        facets
    }
}
