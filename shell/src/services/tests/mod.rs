//! Service-specific tests
//!
//! Prober tests run against wiremock and real loopback listeners; process
//! supervision tests spawn real `sh`/`sleep` children on Unix.


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use std::time::Duration;
    use wiremock::MockServer;

    use crate::types::ProbeTarget;

    /// Generous bound for operations that should finish quickly
    pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn health_target(server: &MockServer, timeout: Duration) -> ProbeTarget {
        ProbeTarget::http("127.0.0.1", server.address().port(), "/api/health", timeout)
    }
}
