//! Simulation events and the subscription surface
//!
//! The orchestrator emits typed events as each phase runs. Subscribers
//! are fallible; a failing subscriber is logged and skipped, never
//! allowed to abort the step.

use crate::actions::ActionKind;
use crate::core::error::Result;
use crate::core::types::SimTime;
use crate::simulation::stats::SimulationStats;

/// Events generated during a simulation step
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    /// An agent performed an action, autonomously or by suggestion
    AgentAction {
        agent: String,
        action: ActionKind,
        ai_suggested: bool,
        success: bool,
        time: SimTime,
    },
    /// Two co-located agents interacted socially
    SocialInteraction {
        agent1: String,
        agent2: String,
        location: String,
        time: SimTime,
    },
    /// A discovery pass grew the pattern store
    PatternDiscovered {
        new_patterns: usize,
        total_patterns: usize,
        time: SimTime,
    },
    /// End-of-step statistics
    SimulationUpdate { time: SimTime, stats: SimulationStats },
}

/// Subscription key for the event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    AgentAction,
    SocialInteraction,
    PatternDiscovered,
    SimulationUpdate,
}

impl SimulationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimulationEvent::AgentAction { .. } => EventKind::AgentAction,
            SimulationEvent::SocialInteraction { .. } => EventKind::SocialInteraction,
            SimulationEvent::PatternDiscovered { .. } => EventKind::PatternDiscovered,
            SimulationEvent::SimulationUpdate { .. } => EventKind::SimulationUpdate,
        }
    }
}

/// A fallible event subscriber
pub type EventCallback = Box<dyn FnMut(&SimulationEvent) -> Result<()> + Send>;

/// Per-kind subscriber registry
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(EventKind, EventCallback)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, callback: EventCallback) {
        self.subscribers.push((kind, callback));
    }

    /// Deliver to every subscriber of the event's kind; errors are
    /// isolated per callback
    pub fn emit(&mut self, event: &SimulationEvent) {
        let kind = event.kind();
        for (subscribed, callback) in &mut self.subscribers {
            if *subscribed != kind {
                continue;
            }
            if let Err(err) = callback(event) {
                tracing::warn!(?kind, %err, "event subscriber failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::VivariumError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn update_event(time: SimTime) -> SimulationEvent {
        SimulationEvent::SimulationUpdate {
            time,
            stats: SimulationStats::default(),
        }
    }

    #[test]
    fn test_subscriber_receives_matching_kind_only() {
        let mut bus = EventBus::new();
        let updates = Arc::new(AtomicUsize::new(0));
        let counter = updates.clone();
        bus.subscribe(
            EventKind::SimulationUpdate,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        bus.emit(&update_event(1.0));
        bus.emit(&SimulationEvent::AgentAction {
            agent: "A".into(),
            action: ActionKind::Eat,
            ai_suggested: false,
            success: true,
            time: 1.0,
        });
        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_subscriber_does_not_stop_others() {
        let mut bus = EventBus::new();
        bus.subscribe(
            EventKind::SimulationUpdate,
            Box::new(|_| Err(VivariumError::Subscriber("intentional".into()))),
        );

        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = delivered.clone();
        bus.subscribe(
            EventKind::SimulationUpdate,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        bus.emit(&update_event(1.0));
        bus.emit(&update_event(2.0));
        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_multiple_subscribers_same_kind() {
        let mut bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let counter = count.clone();
            bus.subscribe(
                EventKind::SocialInteraction,
                Box::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            );
        }

        bus.emit(&SimulationEvent::SocialInteraction {
            agent1: "A".into(),
            agent2: "B".into(),
            location: "City Park".into(),
            time: 0.0,
        });
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
