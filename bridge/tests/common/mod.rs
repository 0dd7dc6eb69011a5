//! Common test utilities for the bridge test suites

pub mod fixtures;

pub use fixtures::TestFixtures;
