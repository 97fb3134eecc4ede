//! Evaluation metrics
//!
//! Consumes the stream of per-action records the orchestrator emits and
//! produces the summary statistics the simulation surfaces but does not
//! compute itself: average happiness, decision diversity, and pattern
//! emergence over time.

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::agent::memory::NeedSnapshot;
use crate::agent::Agent;
use crate::core::error::Result;
use crate::core::types::{AgentId, SimTime};

/// Keep at most this many raw action records in memory
const RECORD_LIMIT: usize = 10_000;

/// Records retained after trimming past the limit
const RECORD_TRIM_TO: usize = 5_000;

/// One observed action outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub agent_id: AgentId,
    pub action: ActionKind,
    pub success: bool,
    pub reward: f32,
    pub needs: NeedSnapshot,
    pub money: f32,
    pub mood: f32,
    pub sim_time: SimTime,
}

/// Periodic summary of the whole population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub sim_time: SimTime,
    pub avg_happiness: f32,
    pub decision_diversity: f32,
    pub pattern_count: usize,
    pub established_patterns: usize,
    pub agent_count: usize,
}

/// Metrics collector and reporter
#[derive(Debug, Default)]
pub struct Metrics {
    records: Vec<ActionRecord>,
    snapshots: Vec<MetricSnapshot>,
    total_records: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_action(&mut self, record: ActionRecord) {
        self.records.push(record);
        self.total_records += 1;
        if self.records.len() > RECORD_LIMIT {
            self.records.drain(..self.records.len() - RECORD_TRIM_TO);
        }
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn snapshots(&self) -> &[MetricSnapshot] {
        &self.snapshots
    }

    /// Global well-being: each agent's happiness blended with its
    /// energy reserve and hunger/social deficits
    pub fn avg_happiness(agents: &[Agent]) -> f32 {
        if agents.is_empty() {
            return 0.0;
        }
        let sum: f32 = agents
            .iter()
            .map(|a| {
                let energy = a.needs.energy.value / 100.0;
                let fed = (100.0 - a.needs.hunger.value) / 100.0;
                let social = (100.0 - a.needs.social.value) / 100.0;
                (a.needs.happiness.value + energy * 20.0 + fed * 15.0 + social * 10.0) / 100.0
            })
            .sum();
        sum / agents.len() as f32
    }

    /// Shannon entropy of the population's recent decisions, normalized
    /// to [0, 1] by the maximum entropy over the action set
    pub fn decision_diversity(agents: &[Agent]) -> f32 {
        let mut counts = [0usize; 5];
        let mut total = 0usize;
        for agent in agents {
            for action in agent.recent_actions.iter() {
                counts[action.index()] += 1;
                total += 1;
            }
        }
        if total == 0 {
            return 0.0;
        }

        let entropy: f32 = counts
            .iter()
            .filter(|c| **c > 0)
            .map(|c| {
                let p = *c as f32 / total as f32;
                -p * p.log2()
            })
            .sum();

        entropy / (ActionKind::ALL.len() as f32).log2()
    }

    /// Capture a population snapshot
    pub fn take_snapshot(
        &mut self,
        sim_time: SimTime,
        agents: &[Agent],
        pattern_count: usize,
        established_patterns: usize,
    ) {
        self.snapshots.push(MetricSnapshot {
            sim_time,
            avg_happiness: Self::avg_happiness(agents),
            decision_diversity: Self::decision_diversity(agents),
            pattern_count,
            established_patterns,
            agent_count: agents.len(),
        });
    }

    /// Happiness change from the first to the latest snapshot
    pub fn happiness_trend(&self) -> f32 {
        match (self.snapshots.first(), self.snapshots.last()) {
            (Some(first), Some(last)) if self.snapshots.len() > 1 => {
                last.avg_happiness - first.avg_happiness
            }
            _ => 0.0,
        }
    }

    /// Fraction of recorded actions that succeeded
    pub fn success_rate(&self) -> f32 {
        if self.records.is_empty() {
            return 0.0;
        }
        let hits = self.records.iter().filter(|r| r.success).count();
        hits as f32 / self.records.len() as f32
    }

    /// Plain-text summary report
    pub fn report(&self) -> String {
        let mut out = String::from("=== Simulation Metrics ===\n");
        out.push_str(&format!("Actions recorded: {}\n", self.total_records));
        out.push_str(&format!("Action success rate: {:.1}%\n", self.success_rate() * 100.0));
        out.push_str(&format!("Happiness trend: {:+.3}\n", self.happiness_trend()));
        if let Some(last) = self.snapshots.last() {
            out.push_str(&format!("Avg happiness: {:.3}\n", last.avg_happiness));
            out.push_str(&format!("Decision diversity: {:.3}\n", last.decision_diversity));
            out.push_str(&format!(
                "Patterns: {} ({} established)\n",
                last.pattern_count, last.established_patterns
            ));
        }
        out
    }

    /// Export snapshots as JSON
    pub fn export_snapshots(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshots)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn population(n: u32, seed: u64) -> Vec<Agent> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|i| Agent::new(AgentId::new(i), format!("Agent_{i}"), &mut rng))
            .collect()
    }

    fn record(action: ActionKind, success: bool) -> ActionRecord {
        ActionRecord {
            agent_id: AgentId::new(0),
            action,
            success,
            reward: 0.5,
            needs: NeedSnapshot {
                hunger: 50.0,
                energy: 50.0,
                happiness: 50.0,
                social: 50.0,
            },
            money: 100.0,
            mood: 0.5,
            sim_time: 0.0,
        }
    }

    #[test]
    fn test_avg_happiness_empty_population() {
        assert_eq!(Metrics::avg_happiness(&[]), 0.0);
    }

    #[test]
    fn test_diversity_zero_without_history() {
        let agents = population(5, 1);
        assert_eq!(Metrics::decision_diversity(&agents), 0.0);
    }

    #[test]
    fn test_diversity_zero_for_single_action() {
        let mut agents = population(3, 2);
        for agent in &mut agents {
            for _ in 0..10 {
                agent.recent_actions.push(ActionKind::Work);
            }
        }
        assert!(Metrics::decision_diversity(&agents).abs() < 1e-6);
    }

    #[test]
    fn test_diversity_maximal_for_uniform_actions() {
        let mut agents = population(5, 3);
        for agent in &mut agents {
            for action in ActionKind::ALL {
                agent.recent_actions.push(action);
            }
        }
        let diversity = Metrics::decision_diversity(&agents);
        assert!((diversity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_success_rate() {
        let mut metrics = Metrics::new();
        metrics.record_action(record(ActionKind::Eat, true));
        metrics.record_action(record(ActionKind::Work, true));
        metrics.record_action(record(ActionKind::Sleep, false));
        assert!((metrics.success_rate() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_record_trimming_keeps_totals() {
        let mut metrics = Metrics::new();
        for _ in 0..(RECORD_LIMIT + 100) {
            metrics.record_action(record(ActionKind::Idle, true));
        }
        assert!(metrics.records().len() <= RECORD_LIMIT);
        assert_eq!(metrics.total_records, (RECORD_LIMIT + 100) as u64);
    }

    #[test]
    fn test_happiness_trend_needs_two_snapshots() {
        let mut metrics = Metrics::new();
        let agents = population(3, 4);
        metrics.take_snapshot(0.0, &agents, 0, 0);
        assert_eq!(metrics.happiness_trend(), 0.0);
        metrics.take_snapshot(10.0, &agents, 2, 1);
        // Identical population, flat trend
        assert!(metrics.happiness_trend().abs() < 1e-6);
    }
}
