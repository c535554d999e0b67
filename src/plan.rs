//! Per-week trading plans keyed by `"{weekKey}-{field}"`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A planning row shown under each week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanField {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

pub const PLAN_FIELDS: [PlanField; 5] = [
    PlanField {
        key: "expectedbias",
        label: "Expected Bias",
        placeholder: "Bearish",
    },
    PlanField {
        key: "sessionbefore",
        label: "Session Before",
        placeholder: "London Behaviour",
    },
    PlanField {
        key: "target",
        label: "Target",
        placeholder: "Old Lows",
    },
    PlanField {
        key: "outcome",
        label: "Outcome",
        placeholder: "Target hit",
    },
    PlanField {
        key: "notes",
        label: "Notes",
        placeholder: "Await liquidity",
    },
];

pub const SESSION_BEFORE_OPTIONS: [&str; 3] = [
    "London Retracement",
    "London Consolidation",
    "London Expansion",
];

pub fn is_plan_field(key: &str) -> bool {
    PLAN_FIELDS.iter().any(|f| f.key == key)
}

/// Day name -> free text.
pub type DayValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyPlans {
    entries: BTreeMap<String, DayValues>,
}

fn plan_key(week: &str, field: &str) -> String {
    format!("{week}-{field}")
}

impl WeeklyPlans {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, DayValues> {
        &self.entries
    }

    pub fn update_plan(&mut self, week: &str, field: &str, day: &str, value: &str) {
        self.entries
            .entry(plan_key(week, field))
            .or_default()
            .insert(day.to_string(), value.to_string());
    }

    /// Empty map when nothing is planned.
    pub fn get_plan(&self, week: &str, field: &str) -> DayValues {
        self.entries
            .get(&plan_key(week, field))
            .cloned()
            .unwrap_or_default()
    }

    /// Merge `field -> (day -> value)` into the week; days not given are kept.
    pub fn update_week_plan(&mut self, week: &str, plan: BTreeMap<String, DayValues>) {
        for (field, days) in plan {
            self.entries
                .entry(plan_key(week, &field))
                .or_default()
                .extend(days);
        }
    }

    fn week_keys<'a>(&'a self, week: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        let prefix = format!("{week}-");
        self.entries.keys().filter(move |k| k.starts_with(&prefix))
    }

    pub fn clear_week_plan(&mut self, week: &str) {
        let doomed: Vec<String> = self.week_keys(week).cloned().collect();
        for key in doomed {
            self.entries.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The week's rows keyed by field name.
    pub fn export_week_plan(&self, week: &str) -> BTreeMap<String, DayValues> {
        let prefix = format!("{week}-");
        self.entries
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(&prefix)
                    .map(|field| (field.to_string(), v.clone()))
            })
            .collect()
    }

    /// Sorted, distinct week keys that carry plan data.
    ///
    /// The week is the leading `YYYY-MM-DD` of each entry key; other keys are ignored.
    pub fn planned_weeks(&self) -> Vec<String> {
        let mut weeks: Vec<String> = self
            .entries
            .keys()
            .filter_map(|k| k.get(..10))
            .filter(|w| NaiveDate::parse_from_str(w, "%Y-%m-%d").is_ok())
            .map(str::to_string)
            .collect();
        weeks.sort();
        weeks.dedup();
        weeks
    }

    pub fn has_week_plan(&self, week: &str) -> bool {
        self.week_keys(week).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(pairs: &[(&str, &str)]) -> DayValues {
        pairs
            .iter()
            .map(|(d, v)| (d.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn update_and_read_back() {
        let mut p = WeeklyPlans::default();
        p.update_plan("2025-03-03", "expectedbias", "Monday", "Bullish");
        p.update_plan("2025-03-03", "expectedbias", "Tuesday", "Bearish");
        p.update_plan("2025-03-03", "expectedbias", "Monday", "Neutral");

        let got = p.get_plan("2025-03-03", "expectedbias");
        assert_eq!(got, days(&[("Monday", "Neutral"), ("Tuesday", "Bearish")]));
        assert!(p.get_plan("2025-03-03", "target").is_empty());
    }

    #[test]
    fn week_plan_merges_per_field() {
        let mut p = WeeklyPlans::default();
        p.update_plan("2025-03-03", "target", "Monday", "Old Lows");

        let mut batch = BTreeMap::new();
        batch.insert("target".to_string(), days(&[("Friday", "PDH")]));
        batch.insert("notes".to_string(), days(&[("Monday", "FOMC week")]));
        p.update_week_plan("2025-03-03", batch);

        assert_eq!(
            p.get_plan("2025-03-03", "target"),
            days(&[("Friday", "PDH"), ("Monday", "Old Lows")])
        );
        let export = p.export_week_plan("2025-03-03");
        assert_eq!(export.len(), 2);
        assert_eq!(export["notes"], days(&[("Monday", "FOMC week")]));
    }

    #[test]
    fn clear_week_leaves_other_weeks() {
        let mut p = WeeklyPlans::default();
        p.update_plan("2025-03-03", "target", "Monday", "a");
        p.update_plan("2025-03-03", "outcome", "Monday", "b");
        p.update_plan("2025-03-10", "target", "Monday", "c");

        assert!(p.has_week_plan("2025-03-03"));
        p.clear_week_plan("2025-03-03");
        assert!(!p.has_week_plan("2025-03-03"));
        assert!(p.has_week_plan("2025-03-10"));
        assert_eq!(p.entries().len(), 1);
    }

    #[test]
    fn planned_weeks_are_sorted_iso_keys() {
        let mut p = WeeklyPlans::default();
        p.update_plan("2025-03-10", "target", "Monday", "x");
        p.update_plan("2025-03-03", "notes", "Friday", "y");
        p.update_plan("2025-03-03", "target", "Friday", "z");
        p.update_plan("garbage", "notes", "Friday", "w");
        assert_eq!(p.planned_weeks(), vec!["2025-03-03", "2025-03-10"]);
    }

    #[test]
    fn stored_shape_is_a_flat_map() {
        let mut p = WeeklyPlans::default();
        p.update_plan("2025-03-03", "sessionbefore", "Monday", SESSION_BEFORE_OPTIONS[0]);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["2025-03-03-sessionbefore"]["Monday"], "London Retracement");

        let back: WeeklyPlans = serde_json::from_value(v).unwrap();
        assert_eq!(back, p);
        assert!(is_plan_field("sessionbefore"));
        assert!(!is_plan_field("mood"));
    }
}
