//! Aggregate trade performance.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::types::Trade;
use crate::utils::round_to;

/// Ratio of average win to average loss, or not available when there are no losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Ratio(f64),
    NotAvailable,
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Ratio(r) => write!(f, "{r:.2}"),
            ProfitFactor::NotAvailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for ProfitFactor {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    pub gross_pnl: f64,
    pub total_commission: f64,
    pub total_fees: f64,
    pub net_pnl: f64,
    /// Percentage, one decimal place.
    pub win_rate: f64,
    pub avg_win: f64,
    /// Mean of losing P&L; negative when there are losses.
    pub avg_loss: f64,
    pub profit_factor: ProfitFactor,
}

impl Stats {
    fn empty() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            break_even_trades: 0,
            gross_pnl: 0.0,
            total_commission: 0.0,
            total_fees: 0.0,
            net_pnl: 0.0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            profit_factor: ProfitFactor::NotAvailable,
        }
    }
}

fn win_rate(wins: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(wins as f64 / total as f64 * 100.0, 1)
}

pub fn compute_stats(trades: &[Trade]) -> Stats {
    if trades.is_empty() {
        return Stats::empty();
    }

    let pnls: Vec<f64> = trades.iter().map(Trade::pnl_value).collect();
    let wins: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
    let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).collect();
    let break_even = pnls.iter().filter(|p| **p == 0.0).count();

    let gross_pnl: f64 = pnls.iter().sum();
    let total_commission: f64 = trades.iter().map(Trade::commission_value).sum();
    let total_fees: f64 = trades.iter().map(Trade::fees_value).sum();

    let mean = |v: &[f64]| {
        if v.is_empty() {
            0.0
        } else {
            v.iter().sum::<f64>() / v.len() as f64
        }
    };
    let avg_win = mean(&wins);
    let avg_loss = mean(&losses);

    let profit_factor = if avg_loss != 0.0 {
        ProfitFactor::Ratio(round_to((avg_win / avg_loss).abs(), 2))
    } else {
        ProfitFactor::NotAvailable
    };

    Stats {
        total_trades: trades.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        break_even_trades: break_even,
        gross_pnl,
        total_commission,
        total_fees,
        net_pnl: gross_pnl - total_commission - total_fees,
        win_rate: win_rate(wins.len(), trades.len()),
        avg_win,
        avg_loss,
        profit_factor,
    }
}

/// Header figures for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub total_pnl: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
}

pub fn summarize_day(trades: &[Trade]) -> DaySummary {
    let pnls: Vec<f64> = trades.iter().map(Trade::pnl_value).collect();
    let winning = pnls.iter().filter(|p| **p > 0.0).count();
    DaySummary {
        total_pnl: pnls.iter().sum(),
        total_trades: trades.len(),
        winning_trades: winning,
        losing_trades: pnls.iter().filter(|p| **p < 0.0).count(),
        win_rate: win_rate(winning, trades.len()),
    }
}
