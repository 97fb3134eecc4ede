//! Simulation configuration with documented constants
//!
//! Orchestration-level tunables live here. Algorithm-local constants
//! (softmax temperature, habit reinforcement deltas, pattern matching
//! tolerances) stay as module constants next to the code they shape.

/// Configuration for the simulation engine
///
/// These values have been tuned to produce visible emergent behavior
/// within a few thousand steps. Changing them affects pacing, not
/// correctness: every subsystem clamps its own state.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of agents in the population
    pub agent_count: u32,

    /// RNG seed for the whole run (world, agents, miner all derive from it)
    pub seed: u64,

    /// Simulation time advanced per step (abstract time units)
    ///
    /// At 0.1, an action lasting 1-3 time units spans 10-30 steps,
    /// so agents commit to actions over many steps.
    pub time_step: f64,

    // === BEHAVIOR MODEL ===
    /// Per-agent chance per step of consulting the pattern miner
    ///
    /// The miner applies its own exploration gate on top, so the
    /// effective override rate is lower than this.
    pub suggestion_check_chance: f64,

    /// Per-agent chance per step of running habit evolution
    ///
    /// Habit evolution reads the last ~20 memory records; running it
    /// every step would just re-read the same window.
    pub habit_evolve_chance: f64,

    /// Accumulated time units between pattern discovery passes
    pub discovery_interval: f64,

    /// Accumulated time units between pattern evolve (prune/mutate) passes
    ///
    /// Kept at 2x the discovery interval so freshly discovered patterns
    /// get at least one discovery cycle of usage before pruning looks
    /// at them.
    pub pattern_evolve_interval: f64,

    /// Accumulated time units between metric snapshots
    pub snapshot_interval: f64,

    // === SOCIAL INTERACTIONS ===
    /// Base probability scale for co-located social interactions
    ///
    /// Multiplied by both agents' mean sociability and mean
    /// agreeableness; 0.3 means two maximally social agents interact
    /// on 30% of the checks.
    pub base_interaction_chance: f64,

    /// Social connection strength gained per interaction (edge clamp 1.0)
    pub social_bond_gain: f32,

    /// Amount of social need satisfied for both parties per interaction
    pub social_need_relief: f32,

    /// Path for pattern store persistence; None disables load/save
    pub patterns_path: Option<std::path::PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_count: 10,
            seed: 12345,
            time_step: 0.1,
            suggestion_check_chance: 0.25,
            habit_evolve_chance: 0.1,
            discovery_interval: 50.0,
            pattern_evolve_interval: 100.0,
            snapshot_interval: 10.0,
            base_interaction_chance: 0.3,
            social_bond_gain: 0.05,
            social_need_relief: 5.0,
            patterns_path: None,
        }
    }
}
