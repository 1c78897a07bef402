//! Oracle request/response types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skytower_core::commands::AtcAction;
use skytower_core::state::{AircraftView, AirportSnapshot};

/// Everything an oracle gets to see for one decision: the aircraft under
/// consideration and the full airport snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub aircraft: AircraftView,
    pub snapshot: AirportSnapshot,
}

/// An oracle's answer. The reasoning string is for logs and frontends;
/// only `action` has authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: AtcAction,
    pub reasoning: String,
    /// Backend-reported confidence in [0, 1]. Rule-based decisions
    /// always report 1.0.
    pub confidence: f64,
}

impl Decision {
    pub fn new(action: AtcAction, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            reasoning: reasoning.into(),
            confidence: 1.0,
        }
    }
}

/// Oracle failure modes. All of them degrade to a wait instruction at
/// the engine.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle backend unavailable: {0}")]
    Unavailable(String),
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}
