//! Utility-based action selection - the heart of autonomous behavior
//!
//! Each candidate action gets a utility score from needs, money,
//! personality, habit strength matched against time of day, mood, and
//! the learned average reward. Selection is a temperature-scaled
//! softmax sample over the scores, never an argmax, so exploration is
//! intrinsic to the policy.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::agent::habits::Habits;
use crate::agent::needs::Needs;
use crate::agent::personality::Personality;

/// Softmax temperature (higher = sharper preference for the best action)
pub const SOFTMAX_TEMPERATURE: f32 = 3.0;

/// Fixed baseline utility assigned to Idle
pub const IDLE_UTILITY: f32 = 0.1;

/// Half-width of the uniform noise added to each utility
pub const UTILITY_NOISE: f32 = 0.3;

/// Scale applied to the habit term (strength * time match * weight * this)
const HABIT_SCALE: f32 = 5.0;

/// Scale applied to the learned average reward term
const REWARD_SCALE: f32 = 0.5;

/// Per-agent decision weights
///
/// Only `habit_strength` enters the utility formula; the other weights
/// are carried as agent state and surfaced in status snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionWeights {
    pub need_urgency: f32,
    pub habit_strength: f32,
    pub personality: f32,
    pub money_factor: f32,
    pub mood_factor: f32,
}

impl Default for DecisionWeights {
    fn default() -> Self {
        Self {
            need_urgency: 0.4,
            habit_strength: 0.2,
            personality: 0.2,
            money_factor: 0.1,
            mood_factor: 0.1,
        }
    }
}

/// Read-only view of everything the utility function consumes
pub struct DecisionContext<'a> {
    pub needs: &'a Needs,
    pub personality: &'a Personality,
    pub habits: &'a Habits,
    pub money: f32,
    pub mood: f32,
    /// Learned average reward per action (`ActionKind::ALL` order, 0 when untried)
    pub avg_rewards: [f32; 5],
    pub habit_weight: f32,
    /// Time of day in [0, 1): 0 = midnight, 0.5 = noon
    pub time_of_day: f32,
}

/// Deterministic utility before noise, floored at 0
pub fn base_utility(ctx: &DecisionContext, action: ActionKind) -> f32 {
    let needs = ctx.needs;
    let p = ctx.personality;

    let mut utility = match action {
        ActionKind::Eat => (needs.hunger.value / 100.0) * 3.0 - ctx.money * 0.001,
        ActionKind::Sleep => ((100.0 - needs.energy.value) / 100.0) * 2.5,
        ActionKind::Socialize => {
            (needs.social.value / 100.0) * p.sociability * 2.0 - ctx.money * 0.0005
        }
        ActionKind::Work => {
            p.ambition * 1.5
                + if ctx.money < 200.0 { 1.0 } else { 0.5 }
                - ((100.0 - needs.energy.value) / 100.0) * 0.5
        }
        ActionKind::Idle => return IDLE_UTILITY,
    };

    // Habit influence: strength scaled by how well the current time of
    // day matches the habit's preferred time
    if let Some(habit) = ctx.habits.get(action) {
        let time_match = 1.0 - (ctx.time_of_day - habit.time_preference).abs();
        utility += habit.strength * time_match * ctx.habit_weight * HABIT_SCALE;
    }

    // Personality multipliers
    utility *= match action {
        ActionKind::Socialize => 0.3 + p.sociability * 0.7,
        ActionKind::Work => 0.3 + p.discipline * 0.7,
        ActionKind::Eat => 0.5 + p.discipline * 0.5,
        _ => 1.0,
    };

    // Mood multiplier
    utility *= 0.7 + ctx.mood * 0.6;

    // Learned average reward
    utility += ctx.avg_rewards[action.index()] * REWARD_SCALE;

    utility.max(0.0)
}

/// Utility with the stochastic perturbation applied, floored at 0
pub fn utility(ctx: &DecisionContext, action: ActionKind, rng: &mut impl Rng) -> f32 {
    (base_utility(ctx, action) + rng.gen_range(-UTILITY_NOISE..UTILITY_NOISE)).max(0.0)
}

/// Choose the next action via temperature-scaled softmax sampling
pub fn decide_action(ctx: &DecisionContext, rng: &mut impl Rng) -> ActionKind {
    let utilities: Vec<f32> = ActionKind::ALL
        .into_iter()
        .map(|action| {
            if action == ActionKind::Idle {
                IDLE_UTILITY
            } else {
                utility(ctx, action, rng)
            }
        })
        .collect();

    let idx = softmax_sample(&utilities, SOFTMAX_TEMPERATURE, rng);
    ActionKind::ALL[idx]
}

/// Sample an index from the softmax distribution over `scores`
///
/// Max-subtracted before exponentiation so large scores cannot overflow.
pub fn softmax_sample(scores: &[f32], temperature: f32, rng: &mut impl Rng) -> usize {
    debug_assert!(!scores.is_empty());
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let weights: Vec<f32> = scores
        .iter()
        .map(|s| ((s - max) * temperature).exp())
        .collect();
    let total: f32 = weights.iter().sum();

    let mut roll = rng.gen_range(0.0..total);
    for (i, w) in weights.iter().enumerate() {
        if roll < *w {
            return i;
        }
        roll -= w;
    }
    scores.len() - 1
}
