//! Scenario tests for the derby controller.
//!
//! - `determinism.rs`: same seed and commands give identical derbies
//! - `integration.rs`: end-to-end scenarios, including backend failures
//! - `helpers.rs`: setup utilities and a fault-injecting backend

mod helpers;
mod integration;

pub use helpers::*;
