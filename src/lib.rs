//! Vivarium: an agent life simulation with emergent behavior patterns
//!
//! A population of agents with needs, personalities, and learned habits
//! makes utility-driven stochastic decisions while a pattern miner
//! clusters their histories into reusable condition -> action rules
//! that feed back into the simulation as suggestions.
//!
//! The split mirrors the data flow: `agent` owns the per-agent decision
//! core, `patterns` owns cross-agent learning, `environment` owns the
//! world, and `simulation` sequences them all in strict phase order.

pub mod actions;
pub mod agent;
pub mod core;
pub mod environment;
pub mod metrics;
pub mod patterns;
pub mod simulation;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{Result, VivariumError};
pub use crate::simulation::SimulationEngine;
