//! Per-day coding time records and the accumulated store

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Seconds spent in one language on one day, as reported by the remote
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSeconds {
    pub name: String,
    pub total_seconds: f64,
}

impl LanguageSeconds {
    pub fn new(name: impl Into<String>, total_seconds: f64) -> Self {
        Self {
            name: name.into(),
            total_seconds,
        }
    }
}

/// One day as fetched from the remote, before ignore filtering
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDay {
    pub date: NaiveDate,
    pub total_seconds: u64,
    pub languages: Vec<LanguageSeconds>,
}

/// Persisted per-day record. Always replaced wholesale on refetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DayRecord {
    #[serde(default)]
    pub total_seconds: u64,
    #[serde(default)]
    pub languages: BTreeMap<String, f64>,
}

/// Accumulated telemetry keyed by ISO date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Store {
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, DayRecord>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Store {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Earliest and latest stored dates
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = *self.days.keys().next()?;
        let last = *self.days.keys().next_back()?;
        Some((first, last))
    }

    /// Overwrite the record for `day.date`, dropping ignored languages.
    ///
    /// Ignored seconds are also taken off the day total so the stored total
    /// stays consistent with the stored languages.
    pub fn merge_day(&mut self, day: FetchedDay, ignore: &IgnoreSet) {
        let mut languages: BTreeMap<String, f64> = BTreeMap::new();
        let mut ignored_seconds = 0.0;

        for lang in day.languages {
            let seconds = lang.total_seconds.max(0.0);
            if ignore.contains(&lang.name) {
                ignored_seconds += seconds;
                continue;
            }
            *languages.entry(lang.name).or_insert(0.0) += seconds;
        }

        let total_seconds = day
            .total_seconds
            .saturating_sub(ignored_seconds.round() as u64);

        self.days.insert(
            day.date,
            DayRecord {
                total_seconds,
                languages,
            },
        );
    }
}

/// Language names excluded from storage and rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreSet(HashSet<String>);

impl IgnoreSet {
    /// Parse a comma-separated list; items are trimmed and empties dropped
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Accumulated seconds for one language across all stored days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageTotal {
    pub name: String,
    pub total_seconds: f64,
}

/// Aggregate of the whole store, recomputed every run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TallySummary {
    pub grand_total_seconds: u64,
    /// In first-encounter order (days ascending, names ascending within a day)
    pub languages: Vec<LanguageTotal>,
}

/// A language ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageEntry {
    pub name: String,
    pub total_seconds: f64,
    pub percent: f64,
    pub display_text: String,
}
