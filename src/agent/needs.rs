//! Needs that drive agent behavior
//!
//! Every need is a bounded scalar on a 0-100 scale. Hunger and social
//! need accumulate (higher = more urgent); energy and happiness drain
//! (higher = better). All mutation clamps at the boundary inside the
//! mutating operation, so floating-point drift can never push a value
//! out of range.

use serde::{Deserialize, Serialize};

/// A single bounded need scalar with decay semantics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedState {
    /// Current level in [0, 100]
    pub value: f32,
    /// Change per time unit (direction depends on the need kind)
    pub decay_rate: f32,
    /// Level above which the need counts as critical
    pub critical_threshold: f32,
}

impl NeedState {
    pub fn new(value: f32, decay_rate: f32) -> Self {
        Self {
            value: value.clamp(0.0, 100.0),
            decay_rate,
            critical_threshold: 30.0,
        }
    }

    /// Increase the level, clamped at 100
    pub fn raise(&mut self, amount: f32) {
        self.value = (self.value + amount).clamp(0.0, 100.0);
    }

    /// Decrease the level, clamped at 0
    pub fn lower(&mut self, amount: f32) {
        self.value = (self.value - amount).clamp(0.0, 100.0);
    }

    /// Satisfy an urgency-style need (hunger, social): reduces the level
    pub fn satisfy(&mut self, amount: f32) {
        self.lower(amount);
    }

    /// Higher values mean more urgency, so critical = above threshold
    pub fn is_critical(&self) -> bool {
        self.value > self.critical_threshold
    }
}

/// The fixed need set every agent carries
///
/// A closed struct, not a map: the need kinds are known at compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: NeedState,
    pub energy: NeedState,
    pub happiness: NeedState,
    pub social: NeedState,
}

impl Needs {
    /// Sample starting needs within the canonical ranges
    pub fn sample(rng: &mut impl rand::Rng) -> Self {
        Self {
            hunger: NeedState::new(rng.gen_range(20.0..50.0), 2.0),
            energy: NeedState::new(rng.gen_range(60.0..90.0), 1.5),
            happiness: NeedState::new(rng.gen_range(40.0..70.0), 0.8),
            social: NeedState::new(rng.gen_range(20.0..50.0), 1.0),
        }
    }

    /// Advance all needs by dt
    ///
    /// Hunger and social need build up; energy drains unless the agent
    /// is sleeping; happiness fades slowly.
    pub fn update(&mut self, dt: f32, sleeping: bool) {
        self.hunger.raise(self.hunger.decay_rate * dt);
        if !sleeping {
            self.energy.lower(self.energy.decay_rate * dt);
        }
        self.social.raise(self.social.decay_rate * dt);
        self.happiness.lower(self.happiness.decay_rate * dt);
    }

    /// Aggregate satisfaction in [0, 1]: deficits inverted, reserves direct
    pub fn overall_satisfaction(&self) -> f32 {
        ((100.0 - self.hunger.value)
            + self.energy.value
            + (100.0 - self.social.value)
            + self.happiness.value)
            / 400.0
    }

    /// Mean raw need level (population satisfaction statistic)
    pub fn mean_level(&self) -> f32 {
        (self.hunger.value + self.energy.value + self.happiness.value + self.social.value) / 4.0
    }
}
