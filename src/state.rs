//! Presence state machine types.

use serde::{Deserialize, Serialize};

/// Reachable presence states. The reference implementation also carries a
/// fourth nominal variant that is never entered; it is dropped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceState {
    Absence,
    MacroPresence,
    MicroPresence,
}

impl Default for PresenceState {
    fn default() -> Self {
        PresenceState::Absence
    }
}

/// Event payload delivered to the host callback on a state-changing
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp_ms: u64,
    /// `-1` when the event carries no range bin (e.g. an absence event).
    pub range_bin: i32,
    pub state: PresenceState,
}
