//! Agents and their decision core
//!
//! An agent exclusively owns its needs, personality, habits, money,
//! mood, and memory; nothing else mutates them except through the
//! operations here. Action execution is committed: once an action is
//! chosen it runs for its full duration before the agent re-decides.

pub mod decision;
pub mod habits;
pub mod memory;
pub mod needs;
pub mod personality;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::core::types::{AgentId, SimTime, Vec2};
use decision::{DecisionContext, DecisionWeights};
use habits::Habits;
use memory::{MemoryRecord, NeedSnapshot, RingBuffer, AGENT_MEMORY_CAPACITY};
use needs::Needs;
use personality::Personality;

/// Mood EMA weights: mood = OLD * mood + NEW * satisfaction
const MOOD_EMA_OLD: f32 = 0.7;
const MOOD_EMA_NEW: f32 = 0.3;

/// Mood shift on action success / failure
const MOOD_SUCCESS_GAIN: f32 = 0.02;
const MOOD_FAILURE_LOSS: f32 = 0.05;

/// Reward penalty accrued on a failed attempt
const FAILURE_PENALTY: f32 = 0.1;

/// New actions last between these many time units
const ACTION_DURATION_MIN: f32 = 1.0;
const ACTION_DURATION_MAX: f32 = 3.0;

/// Memory records required before habit evolution runs
const EVOLVE_MIN_MEMORY: usize = 10;

/// Habit evolution looks at this many recent records
const EVOLVE_WINDOW: usize = 20;

/// How many recent actions feed the decision-diversity metric
const RECENT_ACTION_WINDOW: usize = 10;

/// A virtual human: need state, personality, learned habits, and the
/// decision core that drives them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub needs: Needs,
    pub personality: Personality,
    pub habits: Habits,
    pub money: f32,
    /// Mood in [0, 1], an EMA of overall need satisfaction
    pub mood: f32,
    pub position: Vec2,
    pub current_action: ActionKind,
    /// Time units left on the committed action; re-decide at <= 0
    pub action_remaining: f32,
    pub decision_weights: DecisionWeights,
    /// Accumulated reward per action (`ActionKind::ALL` order)
    pub action_rewards: [f32; 5],
    /// Attempt count per action (`ActionKind::ALL` order)
    pub action_counts: [u32; 5],
    pub memory: RingBuffer<MemoryRecord>,
    pub total_actions: u64,
    /// Recent decisions, for the population diversity metric
    pub recent_actions: RingBuffer<ActionKind>,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>, rng: &mut impl Rng) -> Self {
        Self {
            id,
            name: name.into(),
            needs: Needs::sample(rng),
            personality: Personality::sample(rng),
            habits: Habits::sample(rng),
            money: rng.gen_range(100.0..500.0),
            mood: rng.gen_range(0.3..0.7),
            position: Vec2::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)),
            current_action: ActionKind::Idle,
            action_remaining: 0.0,
            decision_weights: DecisionWeights::default(),
            action_rewards: [0.0; 5],
            action_counts: [0; 5],
            memory: RingBuffer::new(AGENT_MEMORY_CAPACITY),
            total_actions: 0,
            recent_actions: RingBuffer::new(RECENT_ACTION_WINDOW),
        }
    }

    /// Advance needs by dt and fold satisfaction into mood
    pub fn update_needs(&mut self, dt: f32) {
        let sleeping = self.current_action == ActionKind::Sleep;
        self.needs.update(dt, sleeping);
        let satisfaction = self.needs.overall_satisfaction();
        self.mood = (MOOD_EMA_OLD * self.mood + MOOD_EMA_NEW * satisfaction).clamp(0.0, 1.0);
    }

    /// Learned average reward per action, 0 when untried
    pub fn avg_rewards(&self) -> [f32; 5] {
        std::array::from_fn(|i| {
            if self.action_counts[i] > 0 {
                self.action_rewards[i] / self.action_counts[i] as f32
            } else {
                0.0
            }
        })
    }

    /// Read-only view for the utility functions
    pub fn decision_context(&self, time_of_day: f32) -> DecisionContext<'_> {
        DecisionContext {
            needs: &self.needs,
            personality: &self.personality,
            habits: &self.habits,
            money: self.money,
            mood: self.mood,
            avg_rewards: self.avg_rewards(),
            habit_weight: self.decision_weights.habit_strength,
            time_of_day,
        }
    }

    /// Pick the next action via the softmax policy
    pub fn decide_action(&self, time_of_day: f32, rng: &mut impl Rng) -> ActionKind {
        decision::decide_action(&self.decision_context(time_of_day), rng)
    }

    /// Commit to `action` for a fresh random duration
    pub fn start_action(&mut self, action: ActionKind, rng: &mut impl Rng) {
        self.current_action = action;
        self.action_remaining = rng.gen_range(ACTION_DURATION_MIN..ACTION_DURATION_MAX);
    }

    /// Apply the action's state transitions; never an error
    ///
    /// Infeasible preconditions yield success=false: mood drops, a small
    /// negative reward accrues, and the habit weakens. Every attempt
    /// lands in memory with full post-action state.
    pub fn perform_action(&mut self, action: ActionKind, dt: f32, sim_time: SimTime) -> bool {
        let mut success = true;
        let mut reward = 0.0;
        let mut cost = 0.0;

        match action {
            ActionKind::Eat => {
                if self.needs.hunger.value > 10.0 && self.money >= 5.0 {
                    let reduction = (30.0 * dt).min(self.needs.hunger.value);
                    self.needs.hunger.lower(reduction);
                    self.needs.happiness.raise(5.0 * dt);
                    cost = 5.0 * dt;
                    self.money = (self.money - cost).max(0.0);
                    reward = reduction * 0.1;
                } else {
                    success = false;
                }
            }
            ActionKind::Sleep => {
                if self.needs.energy.value < 90.0 {
                    let gain = (40.0 * dt).min(100.0 - self.needs.energy.value);
                    self.needs.energy.raise(gain);
                    self.needs.social.raise(2.0 * dt);
                    reward = gain * 0.05;
                } else {
                    success = false;
                }
            }
            ActionKind::Socialize => {
                if self.needs.social.value > 5.0 && self.money >= 3.0 {
                    let reduction = (25.0 * dt).min(self.needs.social.value);
                    self.needs.social.lower(reduction);
                    self.needs.happiness.raise(8.0 * dt);
                    cost = 3.0 * dt;
                    self.money = (self.money - cost).max(0.0);
                    reward = reduction * 0.08 + self.personality.sociability * 0.1;
                } else {
                    success = false;
                }
            }
            ActionKind::Work => {
                if self.needs.energy.value > 20.0 {
                    let earned = (10.0 + self.personality.ambition * 5.0) * dt;
                    self.money += earned;
                    self.needs.energy.lower(15.0 * dt);
                    self.needs.hunger.raise(8.0 * dt);
                    self.needs.happiness.lower(3.0 * dt);
                    reward = earned * 0.02 + self.personality.ambition * 0.1;
                } else {
                    success = false;
                }
            }
            ActionKind::Idle => {}
        }

        if success {
            self.mood = (self.mood + MOOD_SUCCESS_GAIN).min(1.0);
        } else {
            self.mood = (self.mood - MOOD_FAILURE_LOSS).max(0.0);
        }

        // Online reinforcement
        let idx = action.index();
        self.action_counts[idx] += 1;
        if success {
            self.action_rewards[idx] += reward;
            if reward > 0.5 {
                self.decision_weights.habit_strength =
                    (self.decision_weights.habit_strength + 0.01).min(0.5);
            }
        } else {
            self.action_rewards[idx] -= FAILURE_PENALTY;
        }

        if let Some(habit) = self.habits.get_mut(action) {
            habit.reinforce(success);
        }

        self.memory.push(MemoryRecord {
            action,
            success,
            reward,
            cost,
            sim_time,
            needs: self.need_snapshot(),
            money: self.money,
            mood: self.mood,
        });

        success
    }

    /// One agent step: decay needs, and when the committed action has
    /// run out, decide and perform the next one
    ///
    /// Returns true when a new action was performed this step (the
    /// orchestrator reads the fresh memory record for metrics/events).
    pub fn update(
        &mut self,
        dt: f32,
        time_of_day: f32,
        sim_time: SimTime,
        rng: &mut impl Rng,
    ) -> bool {
        self.update_needs(dt);

        let mut acted = false;
        if self.action_remaining <= 0.0 {
            let action = self.decide_action(time_of_day, rng);
            self.start_action(action, rng);
            self.perform_action(action, dt, sim_time);
            self.total_actions += 1;
            self.recent_actions.push(action);
            acted = true;
        }

        self.action_remaining -= dt;
        acted
    }

    /// Strengthen or weaken habits from the recent outcome window
    ///
    /// No-op below `EVOLVE_MIN_MEMORY` records. Per action: success
    /// rate above 0.7 with positive mean reward strengthens; rate
    /// below 0.3 or mean reward near zero weakens.
    pub fn evolve_habits(&mut self) {
        if self.memory.len() < EVOLVE_MIN_MEMORY {
            return;
        }

        let mut attempts = [0u32; 5];
        let mut successes = [0u32; 5];
        let mut reward_sum = [0.0f32; 5];

        for record in self.memory.last_n(EVOLVE_WINDOW) {
            let idx = record.action.index();
            attempts[idx] += 1;
            if record.success {
                successes[idx] += 1;
            }
            reward_sum[idx] += record.reward;
        }

        for action in ActionKind::TRACKABLE {
            let idx = action.index();
            if attempts[idx] == 0 {
                continue;
            }
            let rate = successes[idx] as f32 / attempts[idx] as f32;
            let avg_reward = reward_sum[idx] / attempts[idx] as f32;

            if let Some(habit) = self.habits.get_mut(action) {
                if rate > 0.7 && avg_reward > 0.1 {
                    habit.adjust_strength(0.02);
                } else if rate < 0.3 || avg_reward < 0.05 {
                    habit.adjust_strength(-0.01);
                }
            }
        }
    }

    pub fn need_snapshot(&self) -> NeedSnapshot {
        NeedSnapshot {
            hunger: self.needs.hunger.value,
            energy: self.needs.energy.value,
            happiness: self.needs.happiness.value,
            social: self.needs.social.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::needs::NeedState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_agent(seed: u64) -> Agent {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Agent::new(AgentId::new(0), "Test_1", &mut rng)
    }

    fn set_needs(agent: &mut Agent, hunger: f32, energy: f32, happiness: f32, social: f32) {
        agent.needs.hunger = NeedState::new(hunger, 2.0);
        agent.needs.energy = NeedState::new(energy, 1.5);
        agent.needs.happiness = NeedState::new(happiness, 0.8);
        agent.needs.social = NeedState::new(social, 1.0);
    }

    #[test]
    fn test_eat_transition_exact() {
        let mut agent = test_agent(1);
        set_needs(&mut agent, 50.0, 50.0, 50.0, 50.0);
        agent.money = 10.0;

        let success = agent.perform_action(ActionKind::Eat, 1.0, 0.0);
        assert!(success);
        assert!((agent.needs.hunger.value - 20.0).abs() < 1e-4);
        assert!((agent.money - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_eat_infeasible_without_money() {
        let mut agent = test_agent(2);
        set_needs(&mut agent, 80.0, 50.0, 50.0, 50.0);
        agent.money = 2.0;
        let mood_before = agent.mood;

        let success = agent.perform_action(ActionKind::Eat, 1.0, 0.0);
        assert!(!success);
        assert_eq!(agent.needs.hunger.value, 80.0);
        assert!(agent.mood < mood_before);
        assert!(agent.action_rewards[ActionKind::Eat.index()] < 0.0);
        // The failure still lands in memory
        assert!(!agent.memory.last().unwrap().success);
    }

    #[test]
    fn test_sleep_refused_when_rested() {
        let mut agent = test_agent(3);
        set_needs(&mut agent, 30.0, 95.0, 50.0, 30.0);
        assert!(!agent.perform_action(ActionKind::Sleep, 1.0, 0.0));
    }

    #[test]
    fn test_work_earns_and_drains() {
        let mut agent = test_agent(4);
        set_needs(&mut agent, 30.0, 80.0, 50.0, 30.0);
        let money_before = agent.money;
        assert!(agent.perform_action(ActionKind::Work, 1.0, 0.0));
        assert!(agent.money > money_before);
        assert!(agent.needs.energy.value < 80.0);
        assert!(agent.needs.hunger.value > 30.0);
    }

    #[test]
    fn test_update_commits_to_action() {
        let mut agent = test_agent(5);
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let acted = agent.update(0.1, 0.5, 0.0, &mut rng);
        assert!(acted);
        assert!(agent.action_remaining > 0.0);
        let committed = agent.current_action;

        // Mid-duration steps never re-decide
        let acted = agent.update(0.1, 0.5, 0.1, &mut rng);
        assert!(!acted);
        assert_eq!(agent.current_action, committed);
    }

    #[test]
    fn test_memory_bounded_at_capacity() {
        let mut agent = test_agent(6);
        agent.money = 1_000_000.0;
        for i in 0..250 {
            set_needs(&mut agent, 50.0, 50.0, 50.0, 50.0);
            agent.perform_action(ActionKind::Eat, 0.1, i as f64);
        }
        assert_eq!(agent.memory.len(), AGENT_MEMORY_CAPACITY);
    }

    #[test]
    fn test_evolve_habits_noop_with_thin_memory() {
        let mut agent = test_agent(7);
        let strengths = agent.habits.strengths();
        agent.evolve_habits();
        assert_eq!(agent.habits.strengths(), strengths);
    }

    #[test]
    fn test_evolve_habits_strengthens_winning_action() {
        let mut agent = test_agent(8);
        agent.money = 1_000_000.0;
        // Build a window of consistently successful, well-rewarded eats
        for i in 0..15 {
            set_needs(&mut agent, 80.0, 50.0, 50.0, 50.0);
            agent.perform_action(ActionKind::Eat, 1.0, i as f64);
        }
        let before = agent.habits.get(ActionKind::Eat).unwrap().strength;
        agent.evolve_habits();
        let after = agent.habits.get(ActionKind::Eat).unwrap().strength;
        assert!(after > before);
    }

    #[test]
    fn test_evolve_habits_weakens_failing_action() {
        let mut agent = test_agent(9);
        agent.money = 0.0;
        // Broke and hungry: every eat attempt fails
        for i in 0..15 {
            set_needs(&mut agent, 80.0, 50.0, 50.0, 50.0);
            agent.perform_action(ActionKind::Eat, 1.0, i as f64);
        }
        let before = agent.habits.get(ActionKind::Eat).unwrap().strength;
        agent.evolve_habits();
        let after = agent.habits.get(ActionKind::Eat).unwrap().strength;
        assert!(after < before);
    }

    #[test]
    fn test_mood_stays_bounded() {
        let mut agent = test_agent(10);
        for _ in 0..500 {
            agent.update_needs(1.0);
            assert!((0.0..=1.0).contains(&agent.mood));
        }
    }
}
