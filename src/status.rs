//! Model lifecycle state machine.
//!
//! State diagram:
//! ```text
//! Idle ──LoadStart──> Loading ──LoadSuccess──> Ready
//!                        │
//!                  [LoadFailure]
//!                        ↓
//!                      Error ──Retry──> Loading
//! ```
//!
//! `Ready` has no outgoing transitions. Any (state, event) pair not drawn
//! above is a no-op: the reducer returns the current state unchanged instead
//! of rejecting the event, so malformed event sequences settle silently.

use serde::{Deserialize, Serialize};

/// Lifecycle states of one model slot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A load is in flight
    Loading,
    /// The pipeline is available
    Ready,
    /// The last load failed
    Error,
}

impl ModelStatus {
    /// Whether a retry makes sense from this state.
    pub fn can_retry(self) -> bool {
        self == Self::Error
    }
}

/// Events that can advance the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum StatusEvent {
    LoadStart,
    LoadSuccess,
    LoadFailure,
    Retry,
}

/// Pure transition function: compute the state after `event`.
///
/// Total over all (state, event) pairs; unknown combinations are no-ops.
pub fn next_model_status(current: ModelStatus, event: StatusEvent) -> ModelStatus {
    match (current, event) {
        (ModelStatus::Idle, StatusEvent::LoadStart) => ModelStatus::Loading,
        (ModelStatus::Loading, StatusEvent::LoadSuccess) => ModelStatus::Ready,
        (ModelStatus::Loading, StatusEvent::LoadFailure) => ModelStatus::Error,
        (ModelStatus::Error, StatusEvent::Retry) => ModelStatus::Loading,
        (state, _) => state,
    }
}
