//! Orchestration: the engine, its event surface, and run statistics

pub mod engine;
pub mod events;
pub mod stats;

pub use engine::SimulationEngine;
pub use events::{EventBus, EventCallback, EventKind, SimulationEvent};
pub use stats::SimulationStats;
