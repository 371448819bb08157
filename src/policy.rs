//! Publication policies and the lifecycle events that sweep them.
//!
//! The registry never decides when a sweep happens. A task-lifecycle driver
//! reports events and the registry removes whatever the event retires.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rule governing when an entry is purged by a bulk sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationPolicy {
    /// Published after a single cycle, then purged at end of cycle.
    Once,
    /// Published every cycle, purged when the activity stops.
    ThroughStop,
    /// Published until removed explicitly or the registry is cleared.
    #[default]
    Forever,
}

impl fmt::Display for PublicationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::ThroughStop => write!(f, "through_stop"),
            Self::Forever => write!(f, "forever"),
        }
    }
}

impl FromStr for PublicationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "through_stop" | "throughstop" => Ok(Self::ThroughStop),
            "forever" => Ok(Self::Forever),
            other => Err(format!("unknown publication policy: {other}")),
        }
    }
}

/// Points in a monitoring task's life at which the driver calls the registry.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    StartOfActivity,
    StartOfCycle,
    EndOfCycle,
    EndOfActivity,
}

impl LifecycleEvent {
    /// The policy whose entries this event retires, if any.
    #[must_use]
    pub const fn retires(self) -> Option<PublicationPolicy> {
        match self {
            Self::EndOfCycle => Some(PublicationPolicy::Once),
            Self::EndOfActivity => Some(PublicationPolicy::ThroughStop),
            Self::StartOfActivity | Self::StartOfCycle => None,
        }
    }
}
