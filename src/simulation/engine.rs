//! The simulation orchestrator
//!
//! Advances the whole population one fixed time step in a strict phase
//! order; each phase completes before the next begins. This is the only
//! component that sequences cross-agent effects: social interactions,
//! pattern suggestions overriding autonomous decisions, and aggregate
//! statistics.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actions::ActionKind;
use crate::agent::Agent;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{AgentId, SimTime};
use crate::environment::{Environment, LocationKind};
use crate::metrics::{ActionRecord, Metrics};
use crate::patterns::{PatternMiner, PatternStore};
use crate::simulation::events::{EventBus, EventCallback, EventKind, SimulationEvent};
use crate::simulation::stats::SimulationStats;

const FIRST_NAMES: [&str; 15] = [
    "Alex", "Sam", "Jordan", "Casey", "Riley", "Avery", "Quinn", "Blake", "Taylor", "Morgan",
    "Sage", "River", "Phoenix", "Rowan", "Skylar",
];

/// Probability that two co-located agents interact, given at least one
/// of them is socializing
pub fn interaction_probability(a: &Agent, b: &Agent, base_chance: f64) -> f64 {
    let sociability = (a.personality.sociability + b.personality.sociability) as f64 / 2.0;
    let agreeableness = (a.personality.agreeableness + b.personality.agreeableness) as f64 / 2.0;
    sociability * agreeableness * base_chance
}

/// Location kind an action pulls the agent toward
fn target_location_kind(action: ActionKind) -> Option<LocationKind> {
    match action {
        ActionKind::Eat => Some(LocationKind::Restaurant),
        ActionKind::Work => Some(LocationKind::Workplace),
        ActionKind::Sleep => Some(LocationKind::Home),
        ActionKind::Socialize => Some(LocationKind::SocialArea),
        ActionKind::Idle => None,
    }
}

/// Owns the population, environment, pattern miner, and metrics, and
/// drives them through the step sequence
pub struct SimulationEngine {
    config: SimulationConfig,
    pub environment: Environment,
    pub agents: Vec<Agent>,
    pub miner: PatternMiner,
    pub metrics: Metrics,
    events: EventBus,
    stats: SimulationStats,
    rng: ChaCha8Rng,
    total_time: SimTime,
    last_discovery: SimTime,
    last_pattern_evolve: SimTime,
    last_snapshot: SimTime,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut environment = Environment::new();

        let mut agents = Vec::with_capacity(config.agent_count as usize);
        for i in 0..config.agent_count {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let mut agent = Agent::new(AgentId::new(i), format!("{}_{}", first, i + 1), &mut rng);

            if let Some(home) = environment
                .find_suitable_location(agent.id, LocationKind::Home, agent.position)
                .map(|loc| (loc.name.clone(), loc.position))
            {
                environment.move_agent(agent.id, &home.0);
                agent.position = home.1;
            }
            agents.push(agent);
        }

        let store = match &config.patterns_path {
            Some(path) => PatternStore::load(path),
            None => PatternStore::new(),
        };

        tracing::info!(
            agents = agents.len(),
            seed = config.seed,
            patterns = store.len(),
            "simulation initialized"
        );

        Self {
            config,
            environment,
            agents,
            miner: PatternMiner::with_store(store),
            metrics: Metrics::new(),
            events: EventBus::new(),
            stats: SimulationStats::default(),
            rng,
            total_time: 0.0,
            last_discovery: 0.0,
            last_pattern_evolve: 0.0,
            last_snapshot: 0.0,
        }
    }

    pub fn subscribe(&mut self, kind: EventKind, callback: EventCallback) {
        self.events.subscribe(kind, callback);
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn total_time(&self) -> SimTime {
        self.total_time
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0 as usize)
    }

    /// Execute one simulation step; all phases run to completion before
    /// this returns
    pub fn step(&mut self) {
        let dt = self.config.time_step;

        // Phase 1: advance the world
        self.environment.update(dt, &mut self.rng);
        let time_of_day = self.environment.time_of_day();

        // Phase 2: independent agent updates
        for i in 0..self.agents.len() {
            let acted = self.agents[i].update(dt as f32, time_of_day, self.total_time, &mut self.rng);
            if acted {
                self.record_last_action(i, false);
            }
        }

        // Phase 3: relocate agents toward action-appropriate places
        self.update_agent_locations();

        // Phase 4: social interactions between co-located agents
        self.process_social_interactions();

        // Phase 5: pattern-miner suggestions may override decisions
        self.apply_pattern_suggestions(time_of_day, dt);

        // Phase 6: occasional habit evolution
        for agent in &mut self.agents {
            if self.rng.gen::<f64>() < self.config.habit_evolve_chance {
                agent.evolve_habits();
            }
        }

        // Phase 7: periodic pattern discovery and evolution
        self.run_pattern_maintenance(time_of_day);

        // Phase 8: time and statistics
        self.total_time += dt;
        self.update_statistics();

        if self.total_time - self.last_snapshot >= self.config.snapshot_interval {
            self.metrics.take_snapshot(
                self.total_time,
                &self.agents,
                self.miner.pattern_count(),
                self.miner.established_count(),
            );
            self.last_snapshot = self.total_time;
        }

        let update = SimulationEvent::SimulationUpdate {
            time: self.total_time,
            stats: self.stats.clone(),
        };
        self.events.emit(&update);
    }

    /// Run `steps` consecutive steps
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
        tracing::debug!(
            time = self.total_time,
            actions = self.stats.total_actions,
            interactions = self.stats.social_interactions,
            patterns = self.stats.pattern_count,
            "run segment finished"
        );
    }

    /// Persist the pattern store if a path is configured
    pub fn save_patterns(&self) -> Result<()> {
        if let Some(path) = &self.config.patterns_path {
            self.miner.store().save(path)?;
        }
        Ok(())
    }

    fn record_last_action(&mut self, agent_idx: usize, ai_suggested: bool) {
        let agent = &self.agents[agent_idx];
        let Some(record) = agent.memory.last() else {
            return;
        };

        self.metrics.record_action(ActionRecord {
            agent_id: agent.id,
            action: record.action,
            success: record.success,
            reward: record.reward,
            needs: record.needs,
            money: record.money,
            mood: record.mood,
            sim_time: self.total_time,
        });

        let event = SimulationEvent::AgentAction {
            agent: agent.name.clone(),
            action: record.action,
            ai_suggested,
            success: record.success,
            time: self.total_time,
        };
        self.events.emit(&event);
    }

    fn update_agent_locations(&mut self) {
        for i in 0..self.agents.len() {
            let agent = &self.agents[i];
            let Some(kind) = target_location_kind(agent.current_action) else {
                continue;
            };

            let current = self.environment.location_of(agent.id).map(|l| l.name.clone());
            let Some(target) = self
                .environment
                .find_suitable_location(agent.id, kind, agent.position)
                .map(|l| (l.name.clone(), l.position))
            else {
                continue;
            };

            if current.as_deref() != Some(target.0.as_str())
                && self.environment.move_agent(agent.id, &target.0)
            {
                self.agents[i].position = target.1;
            }
        }
    }

    fn process_social_interactions(&mut self) {
        // Collect candidate pairs first; mutation happens after
        let mut pairs: Vec<(usize, usize, String)> = Vec::new();
        for location in self.environment.locations() {
            let occupants = &location.occupants;
            for (i, a) in occupants.iter().enumerate() {
                for b in &occupants[i + 1..] {
                    let (ai, bi) = (a.0 as usize, b.0 as usize);
                    let socializing = self.agents[ai].current_action == ActionKind::Socialize
                        || self.agents[bi].current_action == ActionKind::Socialize;
                    if socializing {
                        pairs.push((ai, bi, location.name.clone()));
                    }
                }
            }
        }

        for (ai, bi, location) in pairs {
            let prob = interaction_probability(
                &self.agents[ai],
                &self.agents[bi],
                self.config.base_interaction_chance,
            );
            if self.rng.gen::<f64>() >= prob {
                continue;
            }

            let (id_a, id_b) = (self.agents[ai].id, self.agents[bi].id);
            self.environment
                .strengthen_connection(id_a, id_b, self.config.social_bond_gain);
            let relief = self.config.social_need_relief;
            self.agents[ai].needs.social.satisfy(relief);
            self.agents[bi].needs.social.satisfy(relief);
            self.stats.social_interactions += 1;

            let event = SimulationEvent::SocialInteraction {
                agent1: self.agents[ai].name.clone(),
                agent2: self.agents[bi].name.clone(),
                location,
                time: self.total_time,
            };
            self.events.emit(&event);
        }
    }

    fn apply_pattern_suggestions(&mut self, time_of_day: f32, dt: f64) {
        for i in 0..self.agents.len() {
            if self.rng.gen::<f64>() >= self.config.suggestion_check_chance {
                continue;
            }

            let Some(suggested) = self
                .miner
                .suggest_action(&self.agents[i], time_of_day, &mut self.rng)
            else {
                continue;
            };
            if suggested == self.agents[i].current_action {
                continue;
            }

            // Override the committed action with the suggestion
            let agent = &mut self.agents[i];
            agent.start_action(suggested, &mut self.rng);
            let success = agent.perform_action(suggested, dt as f32, self.total_time);
            agent.total_actions += 1;
            agent.recent_actions.push(suggested);

            self.miner
                .update_pattern_effectiveness(&self.agents[i], time_of_day, suggested, success);
            self.record_last_action(i, true);
        }
    }

    fn run_pattern_maintenance(&mut self, time_of_day: f32) {
        if self.total_time - self.last_discovery >= self.config.discovery_interval {
            let created = self
                .miner
                .discover_patterns(&self.agents, time_of_day, &mut self.rng);
            self.last_discovery = self.total_time;

            if created > 0 {
                let event = SimulationEvent::PatternDiscovered {
                    new_patterns: created,
                    total_patterns: self.miner.pattern_count(),
                    time: self.total_time,
                };
                self.events.emit(&event);
            }
        }

        if self.total_time - self.last_pattern_evolve >= self.config.pattern_evolve_interval {
            let removed = self.miner.evolve_patterns(&mut self.rng);
            self.last_pattern_evolve = self.total_time;
            if removed > 0 {
                tracing::debug!(removed, remaining = self.miner.pattern_count(), "patterns evolved");
            }
        }
    }

    fn update_statistics(&mut self) {
        self.stats.total_time = self.total_time;
        self.stats.total_actions = self.agents.iter().map(|a| a.total_actions).sum();
        self.stats.pattern_count = self.miner.pattern_count();
        self.stats.avg_satisfaction = if self.agents.is_empty() {
            0.0
        } else {
            self.agents.iter().map(|a| a.needs.mean_level()).sum::<f32>() / self.agents.len() as f32
        };
    }
}
