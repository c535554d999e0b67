//! News-event classification into the five calendar categories.
//!
//! Red events split on a case-insensitive substring match against the
//! high-probability list; everything else maps straight from its impact colour.

use serde::Serialize;

use crate::types::NewsEvent;

pub const HIGH_PROBABILITY_RED_EVENTS: &[&str] = &[
    "Unemployment Claims",
    "Initial Jobless Claims",
    "Continuing Claims",
    "Retail Sales",
    "Core Retail Sales",
    "Advance Retail Sales",
    "PPI",
    "Producer Price Index",
    "Core PPI",
    "PCE Price Index",
    "Core PCE Price Index",
    "Personal Spending",
];

/// Reference list only: red events outside the high list are low probability
/// whether or not they appear here.
pub const LOW_PROBABILITY_RED_EVENTS: &[&str] = &[
    "Non Farm Payrolls",
    "NFP",
    "Non-Farm Payrolls",
    "Nonfarm Payrolls",
    "CPI",
    "Core CPI",
    "Consumer Price Index",
    "Core Consumer Price Index",
    "FOMC",
    "Fed Fund Rate",
    "Federal Fund Rate",
    "Interest Rate Decision",
    "Fed Chair",
    "Fed Speaks",
    "FOMC Meeting",
    "FOMC Statement",
    "Consumer Confidence",
    "Michigan Consumer Sentiment",
];

/// Reference list only: orange classification comes from the impact field.
pub const ORANGE_FOLDER_EVENTS: &[&str] = &[
    "Flash Manufacturing PMI",
    "Manufacturing PMI",
    "ISM Manufacturing",
    "Flash Services PMI",
    "Services PMI",
    "ISM Services",
    "Unemployment Rate",
    "U6 Unemployment Rate",
    "GDP",
    "Preliminary GDP",
    "Final GDP",
    "GDP Annualized",
    "Industrial Production",
    "Capacity Utilization",
    "Housing Starts",
    "Building Permits",
    "New Home Sales",
    "Trade Balance",
    "Goods Trade Balance",
    "Current Account",
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum EventCategory {
    HighProbabilityRed,
    LowProbabilityRed,
    OrangeFolder,
    Yellow,
    Gray,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::HighProbabilityRed,
        EventCategory::LowProbabilityRed,
        EventCategory::OrangeFolder,
        EventCategory::Yellow,
        EventCategory::Gray,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::HighProbabilityRed => "High Probability Red Events",
            EventCategory::LowProbabilityRed => "Low Probability Red Events",
            EventCategory::OrangeFolder => "Orange Folder Event",
            EventCategory::Yellow => "Yellow Impact Events",
            EventCategory::Gray => "Gray Impact Events",
        }
    }

    /// Curated keywords associated with the category (empty for yellow/gray).
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            EventCategory::HighProbabilityRed => HIGH_PROBABILITY_RED_EVENTS,
            EventCategory::LowProbabilityRed => LOW_PROBABILITY_RED_EVENTS,
            EventCategory::OrangeFolder => ORANGE_FOLDER_EVENTS,
            EventCategory::Yellow | EventCategory::Gray => &[],
        }
    }
}

/// Substring match of the event name against the high-probability list.
pub fn is_high_probability_name(event_name: &str) -> bool {
    let upper = event_name.to_uppercase();
    HIGH_PROBABILITY_RED_EVENTS
        .iter()
        .any(|kw| upper.contains(&kw.to_uppercase()))
}

pub fn is_high_probability_red(event: &NewsEvent) -> bool {
    event.impact == "red" && is_high_probability_name(&event.event)
}

/// Category for an event; `None` for impact values outside the four colours.
pub fn classify(event: &NewsEvent) -> Option<EventCategory> {
    match event.impact.as_str() {
        "red" if is_high_probability_name(&event.event) => Some(EventCategory::HighProbabilityRed),
        "red" => Some(EventCategory::LowProbabilityRed),
        "orange" => Some(EventCategory::OrangeFolder),
        "yellow" => Some(EventCategory::Yellow),
        "gray" => Some(EventCategory::Gray),
        _ => None,
    }
}
