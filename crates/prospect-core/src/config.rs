//! Discovery configuration.

use serde::{Deserialize, Serialize};

/// Tuning parameters for one chain discovery.
///
/// The defaults are the BIP44 conventions: addresses are derived in chunks of
/// 20 and discovery stops once 20 consecutive trailing addresses have no
/// history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Number of addresses derived per chunk. Defaults to `20`.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    /// Number of trailing unused addresses required before the scan settles.
    /// Defaults to `20`.
    #[serde(default = "default_gap_length")]
    pub gap_length: u32,
}

fn default_chunk_size() -> u32 {
    20
}

fn default_gap_length() -> u32 {
    20
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { chunk_size: default_chunk_size(), gap_length: default_gap_length() }
    }
}
