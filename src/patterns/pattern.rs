//! Behavior patterns: condition signature + action sequence
//!
//! Conditions use a fixed named schema matched field-by-field with an
//! explicit tolerance. Fields are bound by name, never by position in
//! the clustering feature vector, so changing the feature layout can
//! never silently misread a condition.

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::agent::memory::RingBuffer;

/// Absolute tolerance for a numeric condition to count as matched
pub const CONDITION_TOLERANCE: f32 = 0.2;

/// Fraction of present conditions that must match
pub const MATCH_THRESHOLD: f32 = 0.8;

/// Outcomes kept per pattern for the effectiveness estimate
pub const EFFECTIVENESS_CAPACITY: usize = 20;

/// Condition signature over the monitored features, all normalized to
/// [0, 1] (need levels divided by 100)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunger: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub happiness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<f32>,
}

/// An agent's live values for the monitored features, same scale
#[derive(Debug, Clone, Copy)]
pub struct ConditionSnapshot {
    pub hunger: f32,
    pub energy: f32,
    pub happiness: f32,
    pub social: f32,
    pub time_of_day: f32,
}

impl PatternConditions {
    fn pairs(&self, state: &ConditionSnapshot) -> [(Option<f32>, f32); 5] {
        [
            (self.hunger, state.hunger),
            (self.energy, state.energy),
            (self.happiness, state.happiness),
            (self.social, state.social),
            (self.time_of_day, state.time_of_day),
        ]
    }

    /// True when at least `MATCH_THRESHOLD` of the present conditions
    /// are within tolerance of the live state
    pub fn matches(&self, state: &ConditionSnapshot) -> bool {
        let mut matched = 0u32;
        let mut total = 0u32;
        for (expected, current) in self.pairs(state) {
            if let Some(expected) = expected {
                total += 1;
                if (current - expected).abs() < CONDITION_TOLERANCE {
                    matched += 1;
                }
            }
        }
        total > 0 && matched as f32 / total as f32 >= MATCH_THRESHOLD
    }

    /// Perturb every present field by `delta`, clamped to [0, 1]
    pub fn perturbed(&self, mut delta: impl FnMut() -> f32) -> Self {
        let shift = |v: Option<f32>, d: f32| v.map(|x| (x + d).clamp(0.0, 1.0));
        Self {
            hunger: shift(self.hunger, delta()),
            energy: shift(self.energy, delta()),
            happiness: shift(self.happiness, delta()),
            social: shift(self.social, delta()),
            time_of_day: shift(self.time_of_day, delta()),
        }
    }
}

/// A mined condition -> action-sequence rule with effectiveness stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorPattern {
    pub id: String,
    pub conditions: PatternConditions,
    pub actions: Vec<ActionKind>,
    pub success_rate: f32,
    pub usage_count: u32,
    /// Steps since last suggested; reset to 0 on use
    pub recency: u32,
    pub effectiveness: RingBuffer<bool>,
}

impl BehaviorPattern {
    pub fn new(id: String, conditions: PatternConditions, actions: Vec<ActionKind>) -> Self {
        Self {
            id,
            conditions,
            actions,
            success_rate: 0.5,
            usage_count: 0,
            recency: 0,
            effectiveness: RingBuffer::new(EFFECTIVENESS_CAPACITY),
        }
    }

    pub fn first_action(&self) -> Option<ActionKind> {
        self.actions.first().copied()
    }

    /// Fold one outcome into the effectiveness history and re-derive
    /// the success rate as its mean
    pub fn record_outcome(&mut self, success: bool) {
        self.usage_count += 1;
        self.effectiveness.push(success);
        let hits = self.effectiveness.iter().filter(|s| **s).count();
        self.success_rate = hits as f32 / self.effectiveness.len() as f32;
    }

    /// Selection score: success rate with a recency bias toward
    /// recently used patterns
    pub fn score(&self) -> f32 {
        self.success_rate * (1.0 + 0.1 * (100.0 - self.recency as f32))
    }
}
