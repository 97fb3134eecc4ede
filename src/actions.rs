//! Action definitions
//!
//! The action set is closed and known at compile time; everything that
//! iterates actions or keys state by action uses this enum, never
//! open-ended maps.

use serde::{Deserialize, Serialize};

/// The actions an agent can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Eat,
    Work,
    Sleep,
    Socialize,
    Idle,
}

impl ActionKind {
    /// All actions, in canonical order (used for one-hot encodings and
    /// fixed-size per-action state)
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Eat,
        ActionKind::Work,
        ActionKind::Sleep,
        ActionKind::Socialize,
        ActionKind::Idle,
    ];

    /// Actions that can carry a learned habit (everything but Idle)
    pub const TRACKABLE: [ActionKind; 4] = [
        ActionKind::Eat,
        ActionKind::Work,
        ActionKind::Sleep,
        ActionKind::Socialize,
    ];

    /// Dense index into per-action arrays
    pub fn index(self) -> usize {
        match self {
            ActionKind::Eat => 0,
            ActionKind::Work => 1,
            ActionKind::Sleep => 2,
            ActionKind::Socialize => 3,
            ActionKind::Idle => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Eat => "eat",
            ActionKind::Work => "work",
            ActionKind::Sleep => "sleep",
            ActionKind::Socialize => "socialize",
            ActionKind::Idle => "idle",
        }
    }

    /// Parse the persisted name form (pattern store files)
    pub fn parse(name: &str) -> Option<ActionKind> {
        ActionKind::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
