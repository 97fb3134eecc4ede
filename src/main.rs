//! Command-line entry point: run a simulation and report metrics

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vivarium::simulation::{EventKind, SimulationEvent};
use vivarium::{Result, SimulationConfig, SimulationEngine};

#[derive(Parser, Debug)]
#[command(name = "vivarium", about = "Agent life simulation with emergent behavior patterns")]
struct Args {
    /// Number of agents in the population
    #[arg(long, default_value_t = 10)]
    agents: u32,

    /// Number of simulation steps to run
    #[arg(long, default_value_t = 5000)]
    steps: u64,

    /// RNG seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Simulation time per step
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Pattern store file, loaded at start and saved at exit
    #[arg(long)]
    patterns_file: Option<PathBuf>,

    /// Write metric snapshots to this JSON file at exit
    #[arg(long)]
    snapshots_file: Option<PathBuf>,

    /// Steps between progress log lines
    #[arg(long, default_value_t = 1000)]
    report_interval: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vivarium=info")),
        )
        .init();

    let config = SimulationConfig {
        agent_count: args.agents,
        seed: args.seed,
        time_step: args.dt,
        patterns_path: args.patterns_file.clone(),
        ..SimulationConfig::default()
    };

    let mut engine = SimulationEngine::new(config);

    engine.subscribe(
        EventKind::SocialInteraction,
        Box::new(|event| {
            if let SimulationEvent::SocialInteraction {
                agent1,
                agent2,
                location,
                ..
            } = event
            {
                tracing::debug!(%agent1, %agent2, %location, "social interaction");
            }
            Ok(())
        }),
    );

    engine.subscribe(
        EventKind::PatternDiscovered,
        Box::new(|event| {
            if let SimulationEvent::PatternDiscovered {
                new_patterns,
                total_patterns,
                time,
            } = event
            {
                tracing::info!(new_patterns, total_patterns, time, "patterns discovered");
            }
            Ok(())
        }),
    );

    let mut remaining = args.steps;
    while remaining > 0 {
        let chunk = remaining.min(args.report_interval.max(1));
        engine.run(chunk);
        remaining -= chunk;

        let stats = engine.stats();
        tracing::info!(
            time = %format!("{:.1}", stats.total_time),
            actions = stats.total_actions,
            interactions = stats.social_interactions,
            patterns = stats.pattern_count,
            satisfaction = %format!("{:.1}", stats.avg_satisfaction),
            "progress"
        );
    }

    println!("{}", engine.metrics.report());

    if let Some(path) = &args.snapshots_file {
        engine.metrics.export_snapshots(path)?;
        tracing::info!(path = %path.display(), "snapshots exported");
    }
    engine.save_patterns()?;

    Ok(())
}
