//! Whole-simulation runs: invariants, events, persistence, determinism

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use vivarium::simulation::{EventKind, SimulationEvent};
use vivarium::{SimulationConfig, SimulationEngine, VivariumError};

fn config(agents: u32, seed: u64) -> SimulationConfig {
    SimulationConfig {
        agent_count: agents,
        seed,
        ..SimulationConfig::default()
    }
}

#[test]
fn long_run_holds_population_invariants() {
    let mut engine = SimulationEngine::new(config(10, 1));
    engine.run(1500);

    let stats = engine.stats().clone();
    assert!(stats.total_time > 149.0);
    assert!(stats.total_actions > 0);
    assert!((0.0..=100.0).contains(&stats.avg_satisfaction));

    let mut action_sum = 0;
    for agent in &engine.agents {
        for value in [
            agent.needs.hunger.value,
            agent.needs.energy.value,
            agent.needs.happiness.value,
            agent.needs.social.value,
        ] {
            assert!((0.0..=100.0).contains(&value));
        }
        assert!(agent.money >= 0.0);
        assert!((0.0..=1.0).contains(&agent.mood));
        action_sum += agent.total_actions;
    }
    assert_eq!(stats.total_actions, action_sum);

    // Every agent ends up somewhere in the world
    for agent in &engine.agents {
        assert!(engine.environment.location_of(agent.id).is_some());
    }
}

#[test]
fn update_event_fires_every_step() {
    let mut engine = SimulationEngine::new(config(5, 2));
    let updates = Arc::new(AtomicU64::new(0));
    let counter = updates.clone();
    engine.subscribe(
        EventKind::SimulationUpdate,
        Box::new(move |event| {
            if let SimulationEvent::SimulationUpdate { time, .. } = event {
                assert!(*time > 0.0);
            }
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    engine.run(100);
    assert_eq!(updates.load(Ordering::SeqCst), 100);
}

#[test]
fn action_events_match_recorded_actions() {
    let mut engine = SimulationEngine::new(config(8, 3));
    let actions = Arc::new(AtomicU64::new(0));
    let counter = actions.clone();
    engine.subscribe(
        EventKind::AgentAction,
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    engine.run(300);
    let emitted = actions.load(Ordering::SeqCst);
    assert!(emitted > 0);
    assert_eq!(emitted, engine.stats().total_actions);
}

#[test]
fn failing_subscriber_does_not_stop_the_run() {
    let mut engine = SimulationEngine::new(config(5, 4));
    engine.subscribe(
        EventKind::SimulationUpdate,
        Box::new(|_| Err(VivariumError::Subscriber("intentional".into()))),
    );

    let delivered = Arc::new(AtomicU64::new(0));
    let counter = delivered.clone();
    engine.subscribe(
        EventKind::SimulationUpdate,
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    engine.run(50);
    assert_eq!(delivered.load(Ordering::SeqCst), 50);
    assert!(engine.stats().total_time > 4.9);
}

#[test]
fn pattern_store_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.json");

    let mut first = SimulationEngine::new(SimulationConfig {
        agent_count: 10,
        seed: 5,
        patterns_path: Some(path.clone()),
        ..SimulationConfig::default()
    });
    // Long enough for at least two discovery passes
    first.run(1200);
    first.save_patterns().unwrap();
    assert!(path.exists());

    let second = SimulationEngine::new(SimulationConfig {
        agent_count: 10,
        seed: 6,
        patterns_path: Some(path),
        ..SimulationConfig::default()
    });
    assert_eq!(second.miner.pattern_count(), first.miner.pattern_count());
}

#[test]
fn same_seed_reproduces_the_run() {
    let mut a = SimulationEngine::new(config(6, 42));
    let mut b = SimulationEngine::new(config(6, 42));
    a.run(400);
    b.run(400);

    assert_eq!(a.stats().total_actions, b.stats().total_actions);
    assert_eq!(a.stats().social_interactions, b.stats().social_interactions);
    assert_eq!(a.miner.pattern_count(), b.miner.pattern_count());
    for (x, y) in a.agents.iter().zip(b.agents.iter()) {
        assert_eq!(x.name, y.name);
        assert!((x.money - y.money).abs() < 1e-6);
        assert_eq!(x.total_actions, y.total_actions);
    }
}
