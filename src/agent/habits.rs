//! Learned, per-action habits
//!
//! A habit is a propensity strengthened by success and weakened by
//! failure. Gains outpace losses (0.01 vs 0.005) so habits build under
//! mixed outcomes but collapse under consistent failure.

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;

/// Strength gained per successful attempt
const REINFORCE_GAIN: f32 = 0.01;

/// Strength lost per failed attempt
const REINFORCE_LOSS: f32 = 0.005;

/// Learned state for a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitTracker {
    /// Propensity in [0, 1]
    pub strength: f32,
    /// Preferred time of day in [0, 1] (0 = midnight, 0.5 = noon)
    pub time_preference: f32,
    pub success_count: u32,
    pub total_attempts: u32,
}

impl HabitTracker {
    pub fn new(strength: f32, time_preference: f32) -> Self {
        Self {
            strength: strength.clamp(0.0, 1.0),
            time_preference: time_preference.clamp(0.0, 1.0),
            success_count: 0,
            total_attempts: 0,
        }
    }

    /// Strengthen or weaken the habit from one outcome
    pub fn reinforce(&mut self, success: bool) {
        self.total_attempts += 1;
        if success {
            self.success_count += 1;
            self.strength = (self.strength + REINFORCE_GAIN).min(1.0);
        } else {
            self.strength = (self.strength - REINFORCE_LOSS).max(0.0);
        }
    }

    /// Observed success rate; the 0.5 prior applies before any attempts
    pub fn success_rate(&self) -> f32 {
        if self.total_attempts == 0 {
            0.5
        } else {
            self.success_count as f32 / self.total_attempts as f32
        }
    }

    /// Nudge strength directly (habit evolution), clamped
    pub fn adjust_strength(&mut self, delta: f32) {
        self.strength = (self.strength + delta).clamp(0.0, 1.0);
    }
}

/// Fixed per-action habit set (indexed by `ActionKind::TRACKABLE`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habits {
    trackers: [HabitTracker; 4],
}

impl Habits {
    /// Sample starting habits with weak strengths and random daypart bias
    pub fn sample(rng: &mut impl rand::Rng) -> Self {
        Self {
            trackers: std::array::from_fn(|_| {
                HabitTracker::new(rng.gen_range(0.1..0.3), rng.gen_range(0.0..1.0))
            }),
        }
    }

    pub fn get(&self, action: ActionKind) -> Option<&HabitTracker> {
        if action == ActionKind::Idle {
            None
        } else {
            Some(&self.trackers[action.index()])
        }
    }

    pub fn get_mut(&mut self, action: ActionKind) -> Option<&mut HabitTracker> {
        if action == ActionKind::Idle {
            None
        } else {
            Some(&mut self.trackers[action.index()])
        }
    }

    /// Habit strengths in `ActionKind::TRACKABLE` order (feature extraction)
    pub fn strengths(&self) -> [f32; 4] {
        std::array::from_fn(|i| self.trackers[i].strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_success_rate_prior() {
        let habit = HabitTracker::new(0.2, 0.5);
        assert_eq!(habit.success_rate(), 0.5);
    }

    #[test]
    fn test_reinforce_tracks_counts() {
        let mut habit = HabitTracker::new(0.2, 0.5);
        habit.reinforce(true);
        habit.reinforce(true);
        habit.reinforce(false);
        assert_eq!(habit.total_attempts, 3);
        assert_eq!(habit.success_count, 2);
        assert!((habit.success_rate() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_idle_has_no_habit() {
        let mut rng = rand::thread_rng();
        let habits = Habits::sample(&mut rng);
        assert!(habits.get(ActionKind::Idle).is_none());
        assert!(habits.get(ActionKind::Eat).is_some());
    }

    proptest! {
        /// Strength stays in [0, 1] under any outcome sequence
        #[test]
        fn prop_strength_bounded(
            start in 0.0f32..1.0,
            outcomes in prop::collection::vec(any::<bool>(), 0..500)
        ) {
            let mut habit = HabitTracker::new(start, 0.5);
            for success in outcomes {
                habit.reinforce(success);
                prop_assert!(habit.strength >= 0.0 && habit.strength <= 1.0);
            }
        }
    }
}
