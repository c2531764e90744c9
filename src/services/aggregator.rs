//! Aggregator service for reducing the store to totals

use crate::types::{LanguageTotal, Store, TallySummary};
use std::collections::HashMap;

/// Aggregator for computing totals across stored days
pub struct Aggregator;

impl Aggregator {
    /// Sum day totals and per-language seconds across the whole store.
    ///
    /// Both sums come from the same records but are accumulated
    /// independently. Languages keep first-encounter order.
    pub fn summarize(store: &Store) -> TallySummary {
        let mut grand_total_seconds: u64 = 0;
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut languages: Vec<LanguageTotal> = Vec::new();

        for record in store.days.values() {
            grand_total_seconds = grand_total_seconds.saturating_add(record.total_seconds);

            for (name, seconds) in &record.languages {
                match index.get(name.as_str()) {
                    Some(&i) => languages[i].total_seconds += seconds,
                    None => {
                        index.insert(name.as_str(), languages.len());
                        languages.push(LanguageTotal {
                            name: name.clone(),
                            total_seconds: *seconds,
                        });
                    }
                }
            }
        }

        TallySummary {
            grand_total_seconds,
            languages,
        }
    }
}
