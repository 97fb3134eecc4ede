//! Aggregated run statistics

use serde::{Deserialize, Serialize};

use crate::core::types::SimTime;

/// Statistics the orchestrator aggregates each step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    pub total_time: SimTime,
    pub total_actions: u64,
    pub social_interactions: u64,
    pub pattern_count: usize,
    /// Mean raw need level across the population (0-100)
    pub avg_satisfaction: f32,
}
