use serde::{Deserialize, Serialize};

/// How much a dock wants a drop at some point. Higher wins.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Priority {
    #[default]
    CannotDock = 0,
    CanDockAsLast = 1,
    CanDock = 2,
    CanDockWithPriority = 3,
    CanDockWithHighPriority = 4,
}

impl Priority {
    pub fn value(self) -> u8 { self as u8 }

    pub fn can_dock(self) -> bool { self != Priority::CannotDock }

    /// `CanDockWithPriority` inside the priority region, `CanDock` elsewhere.
    pub fn inside(hit: bool) -> Priority {
        if hit { Priority::CanDockWithPriority } else { Priority::CanDock }
    }
}
