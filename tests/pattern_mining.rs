//! Mining lifecycle across modules: discover, suggest, score, evolve

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use vivarium::actions::ActionKind;
use vivarium::agent::needs::NeedState;
use vivarium::agent::Agent;
use vivarium::core::types::AgentId;
use vivarium::patterns::pattern::{BehaviorPattern, PatternConditions};
use vivarium::patterns::{PatternMiner, PatternStore};

fn agent_in_state(id: u32, hunger: f32, rng: &mut ChaCha8Rng) -> Agent {
    let mut agent = Agent::new(AgentId::new(id), format!("Agent_{id}"), rng);
    agent.needs.hunger = NeedState::new(hunger, 2.0);
    agent.needs.energy = NeedState::new(50.0, 1.5);
    agent.needs.happiness = NeedState::new(50.0, 0.8);
    agent.needs.social = NeedState::new(50.0, 1.0);
    agent.money = 1_000.0;
    agent
}

fn established(id: &str, hunger: f32, action: ActionKind) -> BehaviorPattern {
    let mut pattern = BehaviorPattern::new(
        id.to_string(),
        PatternConditions {
            hunger: Some(hunger),
            energy: Some(0.5),
            happiness: None,
            social: None,
            time_of_day: Some(0.5),
        },
        vec![action],
    );
    for _ in 0..10 {
        pattern.record_outcome(true);
    }
    pattern
}

#[test]
fn discovery_produces_usable_patterns_from_population() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut agents = Vec::new();
    for i in 0..6 {
        let mut agent = agent_in_state(i, 95.0, &mut rng);
        for t in 0..8 {
            agent.perform_action(ActionKind::Eat, 0.1, t as f64);
        }
        agents.push(agent);
    }
    for i in 6..12 {
        let mut agent = agent_in_state(i, 5.0, &mut rng);
        for t in 0..8 {
            agent.perform_action(ActionKind::Work, 0.1, t as f64);
        }
        agents.push(agent);
    }

    let mut miner = PatternMiner::new();
    let created = miner.discover_patterns(&agents, 0.5, &mut rng);
    assert!(created >= 1);

    for pattern in miner.store().iter() {
        assert_eq!(pattern.usage_count, 0);
        assert!((pattern.success_rate - 0.5).abs() < 1e-6);
        for value in [
            pattern.conditions.hunger,
            pattern.conditions.energy,
            pattern.conditions.time_of_day,
        ] {
            let v = value.expect("discovery fills every condition");
            assert!((0.0..=1.0).contains(&v));
        }
        assert!(!pattern.actions.is_empty());
    }
}

#[test]
fn suggestions_only_fire_for_matching_state() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let hungry = agent_in_state(0, 85.0, &mut rng);
    let sated = agent_in_state(1, 10.0, &mut rng);

    let mut store = PatternStore::new();
    store.insert(established("hungry_eat", 0.85, ActionKind::Eat));
    let mut miner = PatternMiner::with_store(store);

    let mut hits = 0;
    for _ in 0..200 {
        if let Some(action) = miner.suggest_action(&hungry, 0.5, &mut rng) {
            assert_eq!(action, ActionKind::Eat);
            hits += 1;
        }
    }
    assert!(hits > 100, "matching agent rarely got suggestions: {hits}");

    for _ in 0..200 {
        assert_eq!(miner.suggest_action(&sated, 0.5, &mut rng), None);
    }
}

#[test]
fn recorded_outcomes_move_success_rate_and_usage() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let agent = agent_in_state(0, 85.0, &mut rng);

    let mut store = PatternStore::new();
    store.insert(established("hungry_eat", 0.85, ActionKind::Eat));
    let mut miner = PatternMiner::with_store(store);

    let before = miner.store().get("hungry_eat").unwrap().clone();
    for _ in 0..5 {
        miner.update_pattern_effectiveness(&agent, 0.5, ActionKind::Eat, false);
    }
    let after = miner.store().get("hungry_eat").unwrap();

    assert_eq!(after.usage_count, before.usage_count + 5);
    assert!(after.success_rate < before.success_rate);

    // A non-matching outcome leaves the pattern untouched
    let usage = after.usage_count;
    miner.update_pattern_effectiveness(&agent, 0.5, ActionKind::Work, true);
    assert_eq!(miner.store().get("hungry_eat").unwrap().usage_count, usage);
}

#[test]
fn evolution_prunes_losers_and_keeps_winners() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let mut store = PatternStore::new();
    store.insert(established("winner", 0.8, ActionKind::Eat));

    let mut loser = established("loser", 0.2, ActionKind::Work);
    loser.usage_count = 12;
    loser.success_rate = 0.1;
    store.insert(loser);

    let mut stale = BehaviorPattern::new(
        "stale".to_string(),
        PatternConditions::default(),
        vec![ActionKind::Idle],
    );
    stale.recency = 150;
    store.insert(stale);

    let mut miner = PatternMiner::with_store(store);
    let removed = miner.evolve_patterns(&mut rng);

    assert_eq!(removed, 2);
    assert!(miner.store().get("winner").is_some());
    assert!(miner.store().get("loser").is_none());
    assert!(miner.store().get("stale").is_none());
}

#[test]
fn store_round_trip_preserves_scoring_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.json");

    let mut store = PatternStore::new();
    store.insert(established("a", 0.3, ActionKind::Sleep));
    store.insert(established("b", 0.9, ActionKind::Eat));
    store.save(&path).unwrap();

    let loaded = PatternStore::load(&path);
    assert_eq!(loaded.len(), 2);
    for original in store.iter() {
        let restored = loaded.get(&original.id).unwrap();
        assert!((restored.score() - original.score()).abs() < 1e-5);
        assert_eq!(restored.first_action(), original.first_action());
    }
}
