//! Decision oracles for tower control.
//!
//! The engine is headless and policy-free: every clearance comes from an
//! [`Oracle`]. This crate defines the oracle contract and ships the
//! deterministic rule-based implementation used by default. External
//! backends (LLM services, remote controllers) plug in behind the same
//! trait.

pub mod decision;
pub mod rules;


pub use decision::{Decision, DecisionRequest, OracleError};
pub use rules::RuleBasedOracle;

/// A source of control decisions.
///
/// `decide` is called once per polled aircraft per decision cycle. An
/// `Err` is never fatal: the engine logs it and treats the aircraft as
/// instructed to wait.
pub trait Oracle {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Produce a decision for one aircraft given the current snapshot.
    fn decide(&mut self, request: &DecisionRequest) -> Result<Decision, OracleError>;
}
