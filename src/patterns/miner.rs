//! Generative behavior model: mines, suggests, and evolves patterns
//!
//! Clustering turns noisy per-agent experience into a small library of
//! condition -> action rules; the mutate/prune cycle keeps the library
//! bounded and biased toward proven patterns while still producing
//! novel variants.

use ordered_float::OrderedFloat;
use rand::seq::index::sample;
use rand::Rng;

use crate::actions::ActionKind;
use crate::agent::Agent;
use crate::patterns::cluster::{kmeans, Standardizer};
use crate::patterns::pattern::{BehaviorPattern, ConditionSnapshot, PatternConditions};
use crate::patterns::store::PatternStore;

/// Chance a suggestion query is skipped to preserve autonomous exploration
pub const EXPLORATION_RATE: f64 = 0.2;

/// Usage count at which a pattern counts as established
pub const MIN_PATTERN_USAGE: u32 = 5;

/// Minimum success rate for a pattern to be suggested
const MIN_SUGGEST_SUCCESS: f32 = 0.6;

/// Discovery gates
const MIN_AGENTS: usize = 3;
const MIN_MEMORIES: usize = 5;
const MAX_CLUSTERS: usize = 5;
const MIN_CLUSTER_MEMBERS: usize = 2;

/// Length of the action tail extracted from member memories
const ACTION_TAIL_LEN: usize = 3;

/// Evolution parameters
const STALE_AGE: u32 = 100;
const MUTATION_CANDIDATES: usize = 3;
const MUTATION_CHANCE: f64 = 0.1;
const SWAP_CHANCE: f64 = 0.3;
const CONDITION_JITTER: f32 = 0.1;
const MUTANT_SUCCESS_FACTOR: f32 = 0.9;

/// The pattern mining engine; sole owner of the pattern store
#[derive(Debug, Default)]
pub struct PatternMiner {
    store: PatternStore,
    scaler: Standardizer,
    pattern_counter: u64,
}

impl PatternMiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: PatternStore) -> Self {
        Self {
            store,
            scaler: Standardizer::new(),
            pattern_counter: 0,
        }
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    pub fn pattern_count(&self) -> usize {
        self.store.len()
    }

    pub fn established_count(&self) -> usize {
        self.store
            .iter()
            .filter(|p| p.usage_count >= MIN_PATTERN_USAGE)
            .count()
    }

    pub fn avg_success_rate(&self) -> f32 {
        if self.store.is_empty() {
            return 0.0;
        }
        self.store.iter().map(|p| p.success_rate).sum::<f32>() / self.store.len() as f32
    }

    /// The features the miner monitors, on the condition scale
    fn condition_snapshot(agent: &Agent, time_of_day: f32) -> ConditionSnapshot {
        ConditionSnapshot {
            hunger: agent.needs.hunger.value / 100.0,
            energy: agent.needs.energy.value / 100.0,
            happiness: agent.needs.happiness.value / 100.0,
            social: agent.needs.social.value / 100.0,
            time_of_day,
        }
    }

    /// Full feature vector for clustering: needs, personality,
    /// time-of-day, one-hot current action, habit strengths
    fn feature_vector(agent: &Agent, time_of_day: f32) -> Vec<f32> {
        let mut features = Vec::with_capacity(19);
        features.push(agent.needs.hunger.value / 100.0);
        features.push(agent.needs.energy.value / 100.0);
        features.push(agent.needs.happiness.value / 100.0);
        features.push(agent.needs.social.value / 100.0);

        let p = &agent.personality;
        features.extend([p.openness, p.discipline, p.sociability, p.agreeableness, p.neuroticism]);

        features.push(time_of_day);

        for action in ActionKind::ALL {
            features.push(if agent.current_action == action { 1.0 } else { 0.0 });
        }

        features.extend(agent.habits.strengths());
        features
    }

    /// Cluster agent state snapshots and derive one pattern per viable
    /// cluster; returns the number of patterns created
    pub fn discover_patterns(
        &mut self,
        agents: &[Agent],
        time_of_day: f32,
        rng: &mut impl Rng,
    ) -> usize {
        if agents.len() < MIN_AGENTS {
            return 0;
        }

        let mut vectors = Vec::new();
        let mut snapshots = Vec::new();
        let mut tails: Vec<Vec<ActionKind>> = Vec::new();

        for agent in agents {
            if agent.memory.len() < MIN_MEMORIES {
                continue;
            }
            vectors.push(Self::feature_vector(agent, time_of_day));
            snapshots.push(Self::condition_snapshot(agent, time_of_day));
            tails.push(
                agent
                    .memory
                    .last_n(ACTION_TAIL_LEN)
                    .map(|m| m.action)
                    .collect(),
            );
        }

        if vectors.len() < MIN_AGENTS {
            return 0;
        }

        let k = MAX_CLUSTERS.min(vectors.len() / 2);
        if k < 2 {
            return 0;
        }

        let normalized = self.scaler.fit_transform(&vectors);
        let labels = kmeans(&normalized, k, rng);

        let mut created = 0;
        for cluster in 0..k {
            let members: Vec<usize> = (0..labels.len()).filter(|i| labels[*i] == cluster).collect();
            if members.len() < MIN_CLUSTER_MEMBERS {
                continue;
            }

            let conditions = Self::mean_conditions(&members, &snapshots);
            let Some(actions) = Self::most_common_tail(&members, &tails) else {
                continue;
            };

            let id = format!("pattern_{}_{}", self.pattern_counter, cluster);
            self.pattern_counter += 1;
            self.store.insert(BehaviorPattern::new(id, conditions, actions));
            created += 1;
        }

        if created > 0 {
            tracing::debug!(created, total = self.store.len(), "patterns discovered");
        }
        created
    }

    /// Per-feature mean over the cluster members, as named conditions
    fn mean_conditions(members: &[usize], snapshots: &[ConditionSnapshot]) -> PatternConditions {
        let n = members.len() as f32;
        let mean = |f: fn(&ConditionSnapshot) -> f32| {
            Some(members.iter().map(|i| f(&snapshots[*i])).sum::<f32>() / n)
        };
        PatternConditions {
            hunger: mean(|s| s.hunger),
            energy: mean(|s| s.energy),
            happiness: mean(|s| s.happiness),
            social: mean(|s| s.social),
            time_of_day: mean(|s| s.time_of_day),
        }
    }

    /// Most frequent action tail among members, first-seen wins ties
    fn most_common_tail(members: &[usize], tails: &[Vec<ActionKind>]) -> Option<Vec<ActionKind>> {
        let mut counts: Vec<(&Vec<ActionKind>, usize)> = Vec::new();
        for &i in members {
            if let Some(entry) = counts.iter_mut().find(|(seq, _)| *seq == &tails[i]) {
                entry.1 += 1;
            } else {
                counts.push((&tails[i], 1));
            }
        }

        let mut best: Option<(&Vec<ActionKind>, usize)> = None;
        for (seq, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((seq, count));
            }
        }
        best.map(|(seq, _)| seq.clone()).filter(|seq| !seq.is_empty())
    }

    /// Suggest an action from the best matching established pattern
    ///
    /// Returns None with probability `EXPLORATION_RATE`, and whenever no
    /// pattern matches the agent's current conditions.
    pub fn suggest_action(
        &mut self,
        agent: &Agent,
        time_of_day: f32,
        rng: &mut impl Rng,
    ) -> Option<ActionKind> {
        if rng.gen::<f64>() < EXPLORATION_RATE {
            return None;
        }

        let state = Self::condition_snapshot(agent, time_of_day);

        let best_id = self
            .store
            .iter()
            .filter(|p| {
                p.usage_count >= MIN_PATTERN_USAGE
                    && p.success_rate > MIN_SUGGEST_SUCCESS
                    && p.first_action().is_some()
                    && p.conditions.matches(&state)
            })
            .max_by_key(|p| OrderedFloat(p.score()))
            .map(|p| p.id.clone())?;

        let pattern = self.store.iter_mut().find(|p| p.id == best_id)?;
        pattern.recency = 0;
        pattern.first_action()
    }

    /// Record a suggestion outcome on the first pattern that would have
    /// produced it in the agent's current state
    pub fn update_pattern_effectiveness(
        &mut self,
        agent: &Agent,
        time_of_day: f32,
        suggested: ActionKind,
        success: bool,
    ) {
        let state = Self::condition_snapshot(agent, time_of_day);
        for pattern in self.store.iter_mut() {
            if pattern.first_action() == Some(suggested) && pattern.conditions.matches(&state) {
                pattern.record_outcome(success);
                break;
            }
        }
    }

    /// Age, prune, and mutate the library; returns the number removed
    pub fn evolve_patterns(&mut self, rng: &mut impl Rng) -> usize {
        for pattern in self.store.iter_mut() {
            pattern.recency = pattern.recency.saturating_add(1);
        }

        // Prune proven-ineffective and stale-unused patterns
        let doomed = self.store.ids_where(|p| {
            (p.usage_count >= MIN_PATTERN_USAGE * 2 && p.success_rate < 0.3)
                || (p.recency > STALE_AGE && p.usage_count < MIN_PATTERN_USAGE)
        });
        let removed = doomed.len();
        for id in &doomed {
            self.store.remove(id);
            tracing::debug!(pattern = %id, "pattern pruned");
        }

        self.mutate_successful_patterns(rng);
        removed
    }

    /// Spawn perturbed variants of up to `MUTATION_CANDIDATES` highly
    /// successful patterns
    fn mutate_successful_patterns(&mut self, rng: &mut impl Rng) {
        let candidates: Vec<String> = self
            .store
            .iter()
            .filter(|p| p.success_rate > 0.8 && p.usage_count >= MIN_PATTERN_USAGE)
            .take(MUTATION_CANDIDATES)
            .map(|p| p.id.clone())
            .collect();

        let mut mutants = Vec::new();
        for id in candidates {
            if rng.gen::<f64>() >= MUTATION_CHANCE {
                continue;
            }
            let Some(parent) = self.store.get(&id) else {
                continue;
            };

            let conditions = parent
                .conditions
                .perturbed(|| rng.gen_range(-CONDITION_JITTER..CONDITION_JITTER));

            let mut actions = parent.actions.clone();
            if actions.len() > 1 && rng.gen::<f64>() < SWAP_CHANCE {
                let picked = sample(rng, actions.len(), 2);
                actions.swap(picked.index(0), picked.index(1));
            }

            let mutant_id = format!("mutation_{}_{}", self.pattern_counter, parent.id);
            self.pattern_counter += 1;

            let mut mutant = BehaviorPattern::new(mutant_id, conditions, actions);
            mutant.success_rate = parent.success_rate * MUTANT_SUCCESS_FACTOR;
            mutants.push(mutant);
        }

        for mutant in mutants {
            tracing::debug!(pattern = %mutant.id, "pattern mutated");
            self.store.insert(mutant);
        }
    }
}
