//! News filter state and the filtering/facet helpers built on it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{NewsEvent, ALL};

pub const DEFAULT_DATE_RANGE: &str = "current_week";

/// Currency and impact selection for the weekly news view.
///
/// An empty `impact` set shows nothing; it is not a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub currency: String,
    pub impact: BTreeSet<String>,
    /// Stored for the caller; not used when filtering.
    pub date_range: String,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            currency: ALL.to_string(),
            impact: BTreeSet::new(),
            date_range: DEFAULT_DATE_RANGE.to_string(),
        }
    }
}

impl Filter {
    pub fn set_currency(&mut self, currency: &str) {
        self.currency = currency.to_string();
    }

    pub fn toggle_impact(&mut self, impact: &str) {
        if !self.impact.remove(impact) {
            self.impact.insert(impact.to_string());
        }
    }

    pub fn select_all_impacts<I, S>(&mut self, impacts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.impact = impacts.into_iter().map(Into::into).collect();
    }

    pub fn clear_impacts(&mut self) {
        self.impact.clear();
    }

    pub fn set_date_range(&mut self, range: &str) {
        self.date_range = range.to_string();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn has_active_filters(&self) -> bool {
        self.currency != ALL || !self.impact.is_empty() || self.date_range != DEFAULT_DATE_RANGE
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.currency != ALL {
            parts.push(format!("Currency: {}", self.currency));
        }
        if !self.impact.is_empty() {
            parts.push(format!("Impact: {} selected", self.impact.len()));
        }
        if self.date_range != DEFAULT_DATE_RANGE {
            parts.push(format!("Range: {}", self.date_range));
        }
        if parts.is_empty() {
            "No filters applied".to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn matches(&self, news: &NewsEvent) -> bool {
        if self.currency != ALL && news.currency != self.currency {
            return false;
        }
        self.impact.contains(&news.impact)
    }
}

pub fn filter_news(news: &[NewsEvent], filter: &Filter) -> Vec<NewsEvent> {
    news.iter().filter(|n| filter.matches(n)).cloned().collect()
}

/// Distinct currencies and impacts present in a news set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewsFacets {
    pub currencies: Vec<String>,
    pub impacts: Vec<String>,
}

pub fn news_facets(news: &[NewsEvent]) -> NewsFacets {
    NewsFacets {
        currencies: sorted_distinct(news.iter().map(|n| n.currency.as_str())),
        impacts: sorted_distinct(news.iter().map(|n| n.impact.as_str())),
    }
}

/// Sorted distinct event names, for trade-form pickers.
pub fn news_event_names(news: &[NewsEvent]) -> Vec<String> {
    sorted_distinct(news.iter().map(|n| n.event.as_str()))
}

fn sorted_distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news(currency: &str, impact: &str, event: &str) -> NewsEvent {
        NewsEvent {
            currency: currency.into(),
            impact: impact.into(),
            event: event.into(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<NewsEvent> {
        vec![
            news("USD", "red", "CPI"),
            news("EUR", "orange", "PMI"),
            news("USD", "yellow", "Crude"),
            news("", "gray", "Bank Holiday"),
        ]
    }

    #[test]
    fn empty_impact_selection_shows_nothing() {
        let f = Filter::default();
        assert!(filter_news(&sample(), &f).is_empty());
    }

    #[test]
    fn currency_and_impact_both_apply() {
        let mut f = Filter::default();
        f.select_all_impacts(["red", "orange", "yellow", "gray"]);
        assert_eq!(filter_news(&sample(), &f).len(), 4);

        f.set_currency("USD");
        let got = filter_news(&sample(), &f);
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|n| n.currency == "USD"));

        f.toggle_impact("yellow");
        let got = filter_news(&sample(), &f);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].event, "CPI");
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut f = Filter::default();
        f.toggle_impact("red");
        assert!(f.impact.contains("red"));
        f.toggle_impact("red");
        assert!(f.impact.is_empty());
    }

    #[test]
    fn summary_and_active_state() {
        let mut f = Filter::default();
        assert!(!f.has_active_filters());
        assert_eq!(f.summary(), "No filters applied");

        f.set_currency("GBP");
        f.select_all_impacts(["red", "orange"]);
        f.set_date_range("next_week");
        assert!(f.has_active_filters());
        assert_eq!(
            f.summary(),
            "Currency: GBP, Impact: 2 selected, Range: next_week"
        );

        f.reset();
        assert_eq!(f, Filter::default());
        f.select_all_impacts(["red"]);
        f.clear_impacts();
        assert!(f.impact.is_empty());
    }

    #[test]
    fn facets_are_sorted_distinct_and_non_empty() {
        let facets = news_facets(&sample());
        assert_eq!(facets.currencies, vec!["EUR", "USD"]);
        assert_eq!(facets.impacts, vec!["gray", "orange", "red", "yellow"]);
        assert_eq!(
            news_event_names(&sample()),
            vec!["Bank Holiday", "CPI", "Crude", "PMI"]
        );
    }
}
