//! Behavior pattern mining, suggestion, and evolution

pub mod cluster;
pub mod miner;
pub mod pattern;
pub mod store;

pub use miner::PatternMiner;
pub use pattern::BehaviorPattern;
pub use store::PatternStore;
