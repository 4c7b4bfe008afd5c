//! Shared test support for the v4v workspace
//!
//! `scripted` is an in-memory `SpotApi` used by the scenario suites below.
//! The live suite talks to the Binance spot testnet and is ignored unless
//! asked for with `--ignored`.

pub mod scripted;

pub use scripted::{CallCounts, ScriptedExchange, StepRule};

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod spot_tests;
