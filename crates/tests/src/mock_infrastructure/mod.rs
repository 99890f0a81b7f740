//! Mock Infrastructure for Testing the Prospect Discovery Engine
//!
//! This module provides reusable mock types for testing the pipeline without
//! a real derivation worker process or a blockchain connection.
//!
//! ## Components
//!
//! - `MockBlockchain`: Scripted backend with height-windowed transaction
//!   fixtures, failure injection, and a controllable live event stream
//! - `worker_mock`: In-process derivation workers speaking the real wire
//!   protocol over the real transport: one scripted, one backed by native
//!   derivation
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{MockBlockchain, spawn_scripted_worker};
//!
//! let backend = Arc::new(MockBlockchain::new(1000));
//! backend.add_transaction(tx_match);
//! let channel = spawn_scripted_worker();
//! ```

pub mod mock_blockchain;
pub mod worker_mock;

pub use mock_blockchain::MockBlockchain;
pub use worker_mock::{spawn_native_worker, spawn_scripted_worker};
