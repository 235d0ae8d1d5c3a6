use crate::prefs::PreferenceStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

pub const KEY_HISTORY: &str = "productViews";
pub const HISTORY_LIMIT: usize = 50;

/// One opened details dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub product_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded log of which items were looked at, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewHistory {
    records: Vec<ViewRecord>,
}

impl ViewHistory {
    pub fn from_store(store: &dyn PreferenceStore) -> Self {
        let records = match store.get(KEY_HISTORY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding unreadable view history: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self { records }
    }

    pub fn write_to(&self, store: &mut dyn PreferenceStore) -> Result<(), serde_json::Error> {
        let raw = serde_json::to_string(&self.records)?;
        store.set(KEY_HISTORY, &raw);
        Ok(())
    }

    pub fn record(&mut self, id: &str, at: DateTime<Utc>) {
        self.records.push(ViewRecord {
            product_id: id.to_string(),
            timestamp: at,
        });
        if self.records.len() > HISTORY_LIMIT {
            let excess = self.records.len() - HISTORY_LIMIT;
            self.records.drain(..excess);
        }
    }

    pub fn records(&self) -> &[ViewRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Ids with their view counts, most viewed first. Equal counts keep the
    /// order in which the ids were first seen.
    pub fn most_viewed(&self) -> Vec<(String, usize)> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for r in &self.records {
            let n = counts.entry(&r.product_id).or_insert(0);
            if *n == 0 {
                order.push(&r.product_id);
            }
            *n += 1;
        }
        let mut ranked: Vec<(String, usize)> = order
            .into_iter()
            .map(|id| (id.to_string(), counts[id]))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_record_keeps_last_fifty() {
        let mut history = ViewHistory::default();
        for i in 0..60 {
            history.record(&i.to_string(), at(i));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.records()[0].product_id, "10");
        assert_eq!(history.records()[49].product_id, "59");
    }

    #[test]
    fn test_most_viewed() {
        let mut history = ViewHistory::default();
        for id in ["3", "1", "3", "2", "1", "3"] {
            history.record(id, at(0));
        }
        assert_eq!(
            history.most_viewed(),
            vec![("3".to_string(), 3), ("1".to_string(), 2), ("2".to_string(), 1)]
        );
    }

    #[test]
    fn test_most_viewed_ties_keep_first_seen_order() {
        let mut history = ViewHistory::default();
        for id in ["b", "a", "a", "b"] {
            history.record(id, at(0));
        }
        let ranked: Vec<String> = history.most_viewed().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ranked, vec!["b", "a"]);
    }

    #[test]
    fn test_store_round_trip_and_clear() {
        let mut store = MemoryStore::default();
        let mut history = ViewHistory::from_store(&store);
        assert!(history.is_empty());
        history.record("7", at(5));
        history.write_to(&mut store).unwrap();

        let raw = store.get(KEY_HISTORY).unwrap();
        assert!(raw.contains("\"productId\":\"7\""));

        let mut loaded = ViewHistory::from_store(&store);
        assert_eq!(loaded, history);
        loaded.clear();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let mut store = MemoryStore::default();
        store.set(KEY_HISTORY, "[{oops");
        assert!(ViewHistory::from_store(&store).is_empty());
    }
}
