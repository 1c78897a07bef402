//! Core types and definitions for the SKYTOWER airport simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! entities, commands, state snapshots, events, and constants.
//! It has no dependency on the engine or any runtime framework.

pub mod aircraft;
pub mod airport;
pub mod commands;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
