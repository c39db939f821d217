//! Pairs side and front views of the same exercise

use crate::models::{ExerciseRecord, ParsedView, View};
use std::collections::HashMap;

/// Partial record for one exercise key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseAccumulator {
    pub display_name: String,
    pub side_url: Option<String>,
    pub front_url: Option<String>,
}

impl ExerciseAccumulator {
    fn into_record(self) -> Option<ExerciseRecord> {
        match (self.side_url, self.front_url) {
            (Some(side), Some(front)) if !side.is_empty() && !front.is_empty() => {
                Some(ExerciseRecord::new(self.display_name, side, front))
            }
            _ => None,
        }
    }
}

/// Groups parsed views by exercise key.
///
/// A repeated (key, view) pair overwrites the earlier URL.
#[derive(Debug, Default)]
pub struct PairAggregator {
    entries: HashMap<String, ExerciseAccumulator>,
}

impl PairAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, parsed: ParsedView) {
        let entry = self.entries.entry(parsed.canonical_key).or_default();

        let slot = match parsed.view {
            View::Side => &mut entry.side_url,
            View::Front => &mut entry.front_url,
        };
        if let Some(previous) = slot.replace(parsed.url) {
            log::debug!("Replacing {} view {}", parsed.view, previous);
        }
        entry.display_name = parsed.display_name;
    }

    /// Number of distinct exercise keys seen, paired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ExerciseAccumulator> {
        self.entries.get(key)
    }

    /// Emit a record for every key that has both views. Order is unspecified.
    pub fn finish(self) -> Vec<ExerciseRecord> {
        self.entries
            .into_iter()
            .filter_map(|(key, acc)| {
                let record = acc.into_record();
                if record.is_none() {
                    log::debug!("Dropping unpaired exercise: {}", key);
                }
                record
            })
            .collect()
    }
}

impl Extend<ParsedView> for PairAggregator {
    fn extend<I: IntoIterator<Item = ParsedView>>(&mut self, iter: I) {
        for parsed in iter {
            self.ingest(parsed);
        }
    }
}

impl FromIterator<ParsedView> for PairAggregator {
    fn from_iter<I: IntoIterator<Item = ParsedView>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}
