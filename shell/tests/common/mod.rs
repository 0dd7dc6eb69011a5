//! Common test utilities for the shell test suites

pub mod fixtures;
pub mod helpers;

pub use fixtures::{SwitchProber, TestFixtures};
pub use helpers::{eventually, spawn_run, Harness, OrchestratorBuilder};
