//! Pattern store persistence
//!
//! The store serializes to a JSON map of pattern id to a flat record:
//! conditions, action names, success rate, usage count, and the raw
//! effectiveness history. A missing or corrupt file yields an empty
//! store and a cold start, never an error.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::core::error::Result;
use crate::patterns::pattern::{BehaviorPattern, PatternConditions, EFFECTIVENESS_CAPACITY};

/// The on-disk shape of one pattern
#[derive(Debug, Serialize, Deserialize)]
struct PatternRecord {
    conditions: PatternConditions,
    actions: Vec<String>,
    success_rate: f32,
    usage_count: u32,
    #[serde(default)]
    effectiveness_history: Vec<bool>,
}

/// The pattern library, keyed by pattern id
///
/// BTreeMap keeps persisted output and iteration order deterministic.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    patterns: BTreeMap<String, BehaviorPattern>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn insert(&mut self, pattern: BehaviorPattern) {
        self.patterns.insert(pattern.id.clone(), pattern);
    }

    pub fn remove(&mut self, id: &str) -> Option<BehaviorPattern> {
        self.patterns.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&BehaviorPattern> {
        self.patterns.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorPattern> {
        self.patterns.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BehaviorPattern> {
        self.patterns.values_mut()
    }

    /// Ids of patterns failing `keep`, for two-phase prune
    pub fn ids_where(&self, predicate: impl Fn(&BehaviorPattern) -> bool) -> Vec<String> {
        self.patterns
            .values()
            .filter(|p| predicate(p))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Write the store to `path` as a JSON record map
    pub fn save(&self, path: &Path) -> Result<()> {
        let records: BTreeMap<&str, PatternRecord> = self
            .patterns
            .values()
            .map(|p| {
                (
                    p.id.as_str(),
                    PatternRecord {
                        conditions: p.conditions.clone(),
                        actions: p.actions.iter().map(|a| a.name().to_string()).collect(),
                        success_rate: p.success_rate,
                        usage_count: p.usage_count,
                        effectiveness_history: p.effectiveness.iter().copied().collect(),
                    },
                )
            })
            .collect();

        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)?;
        tracing::debug!(patterns = self.patterns.len(), path = %path.display(), "pattern store saved");
        Ok(())
    }

    /// Load a store from `path`; missing or corrupt files recover to an
    /// empty store (cold-start exploration)
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => {
                tracing::debug!(path = %path.display(), "no pattern store file, starting empty");
                return Self::new();
            }
        };

        let records: BTreeMap<String, PatternRecord> = match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "corrupt pattern store, starting empty");
                return Self::new();
            }
        };

        let mut store = Self::new();
        for (id, record) in records {
            let actions: Vec<ActionKind> = record
                .actions
                .iter()
                .filter_map(|name| ActionKind::parse(name))
                .collect();
            if actions.len() != record.actions.len() {
                tracing::warn!(pattern = %id, "skipping pattern with unknown action names");
                continue;
            }

            let mut pattern = BehaviorPattern::new(id.clone(), record.conditions, actions);
            pattern.success_rate = record.success_rate;
            pattern.usage_count = record.usage_count;
            for outcome in record
                .effectiveness_history
                .iter()
                .rev()
                .take(EFFECTIVENESS_CAPACITY)
                .rev()
            {
                pattern.effectiveness.push(*outcome);
            }
            store.insert(pattern);
        }

        tracing::info!(patterns = store.len(), path = %path.display(), "pattern store loaded");
        store
    }
}
