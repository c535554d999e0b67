//! Weekly news buckets, the halving bias and the per-day category table.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::classify::{classify, is_high_probability_red, EventCategory};
use crate::dates::{day_abbr, is_day_match, week_start, weekday_name, WEEK_DAYS};
use crate::filters::{filter_news, Filter};
use crate::types::NewsEvent;

const FIRST_HALF: [&str; 3] = ["Monday", "Tuesday", "Wednesday"];
const SECOND_HALF: [&str; 2] = ["Thursday", "Friday"];

/// Coarse weekly bias: high-impact news concentrated early (`3|2`) or late (`2|3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halving {
    ThreeTwo,
    TwoThree,
}

impl Halving {
    pub fn as_str(&self) -> &'static str {
        match self {
            Halving::ThreeTwo => "3|2",
            Halving::TwoThree => "2|3",
        }
    }

    /// Index of the weekday column the split line is drawn after.
    pub fn split_after(&self) -> usize {
        match self {
            Halving::ThreeTwo => 2,
            Halving::TwoThree => 1,
        }
    }
}

impl fmt::Display for Halving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Halving {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekBucket {
    /// Monday key of the week.
    pub week: NaiveDate,
    /// Events in ascending date order.
    pub data: Vec<NewsEvent>,
    pub halving: Halving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayAssessment {
    Tradeable,
    LowProbability,
}

/// One weekday column of the weekly table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub day_name: &'static str,
    pub day_abbr: String,
    pub events: Vec<NewsEvent>,
    pub high_red_events: Vec<NewsEvent>,
    pub low_red_events: Vec<NewsEvent>,
    pub orange_events: Vec<NewsEvent>,
    pub yellow_events: Vec<NewsEvent>,
    pub gray_events: Vec<NewsEvent>,
}

impl DayBucket {
    pub fn events_in(&self, category: EventCategory) -> &[NewsEvent] {
        match category {
            EventCategory::HighProbabilityRed => &self.high_red_events,
            EventCategory::LowProbabilityRed => &self.low_red_events,
            EventCategory::OrangeFolder => &self.orange_events,
            EventCategory::Yellow => &self.yellow_events,
            EventCategory::Gray => &self.gray_events,
        }
    }

    pub fn assessment(&self) -> DayAssessment {
        if self.high_red_events.is_empty() {
            DayAssessment::LowProbability
        } else {
            DayAssessment::Tradeable
        }
    }
}

/// Weekday test for an event. Trusts the source `day` column; when that is
/// blank the weekday of the event's date is used instead.
pub fn event_on_day(event: &NewsEvent, target_day: &str) -> bool {
    if event.day.is_empty() {
        return event
            .calendar_date()
            .is_some_and(|d| weekday_name(d) == target_day);
    }
    is_day_match(&event.day, target_day)
}

fn count_on_days<'a>(events: impl Iterator<Item = &'a NewsEvent> + Clone, days: &[&str]) -> usize {
    days.iter()
        .map(|day| events.clone().filter(|e| event_on_day(e, day)).count())
        .sum()
}

/// Compare high-probability red events early vs late in the week, with
/// orange events breaking ties. Equal orange counts fall to `2|3`.
pub fn analyze_weekly_halving(week_events: &[NewsEvent]) -> Halving {
    let high_red = week_events.iter().filter(|e| is_high_probability_red(e));
    let first_half = count_on_days(high_red.clone(), &FIRST_HALF);
    let second_half = count_on_days(high_red, &SECOND_HALF);

    if first_half == second_half {
        let orange = week_events.iter().filter(|e| e.impact == "orange");
        let orange_first = count_on_days(orange.clone(), &FIRST_HALF);
        let orange_second = count_on_days(orange, &SECOND_HALF);
        return if orange_first > orange_second {
            Halving::ThreeTwo
        } else {
            Halving::TwoThree
        };
    }

    if first_half > second_half {
        Halving::ThreeTwo
    } else {
        Halving::TwoThree
    }
}

/// Group events into Monday-keyed weeks, ascending, each with its halving.
///
/// Events whose date cannot be resolved have no week and are left out.
pub fn group_by_week(events: &[NewsEvent]) -> Vec<WeekBucket> {
    let mut weeks: BTreeMap<NaiveDate, Vec<(NaiveDate, NewsEvent)>> = BTreeMap::new();
    for event in events {
        let Some(date) = event.calendar_date() else {
            warn!(event = %event.event, date = %event.date, "news event has no usable date, skipped");
            continue;
        };
        weeks
            .entry(week_start(date))
            .or_default()
            .push((date, event.clone()));
    }

    weeks
        .into_iter()
        .map(|(week, mut dated)| {
            dated.sort_by_key(|(d, _)| *d);
            let data: Vec<NewsEvent> = dated.into_iter().map(|(_, e)| e).collect();
            let halving = analyze_weekly_halving(&data);
            WeekBucket {
                week,
                data,
                halving,
            }
        })
        .collect()
}

/// Filter then group: the weekly calendar view.
pub fn weekly_data(news: &[NewsEvent], filter: &Filter) -> Vec<WeekBucket> {
    group_by_week(&filter_news(news, filter))
}

/// Split a week's events into Monday..Friday columns by category.
/// Weekend events do not appear.
pub fn categorize_events_by_day(week_events: &[NewsEvent]) -> Vec<DayBucket> {
    WEEK_DAYS
        .iter()
        .map(|&day_name| {
            let events: Vec<NewsEvent> = week_events
                .iter()
                .filter(|e| event_on_day(e, day_name))
                .cloned()
                .collect();

            let mut bucket = DayBucket {
                day_name,
                day_abbr: day_abbr(day_name),
                events: Vec::new(),
                high_red_events: Vec::new(),
                low_red_events: Vec::new(),
                orange_events: Vec::new(),
                yellow_events: Vec::new(),
                gray_events: Vec::new(),
            };
            for event in &events {
                let target = match classify(event) {
                    Some(EventCategory::HighProbabilityRed) => &mut bucket.high_red_events,
                    Some(EventCategory::LowProbabilityRed) => &mut bucket.low_red_events,
                    Some(EventCategory::OrangeFolder) => &mut bucket.orange_events,
                    Some(EventCategory::Yellow) => &mut bucket.yellow_events,
                    Some(EventCategory::Gray) => &mut bucket.gray_events,
                    None => continue,
                };
                target.push(event.clone());
            }
            bucket.events = events;
            bucket
        })
        .collect()
}
