//! Integration and End-to-End Tests for the Prospect Discovery Engine
//!
//! This crate contains various test modules:
//!
//! - `discovery_scenario_tests`: Full-pipeline scans against a scripted
//!   backend: cold scan, gap boundaries, live updates, backend failure
//! - `worker_channel_tests`: FIFO stress and worker/native derivation
//!   equivalence through the real wire protocol
//! - `persistence_tests`: Store/restore round-trips and resumed scans
//! - `mock_infrastructure`: Reusable mock types (derivation worker,
//!   blockchain backend)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```



#[cfg(test)]
mod worker_channel_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
