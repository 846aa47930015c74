//! Common utilities for the stylescope analyzer.
//!
//! This crate provides shared infrastructure used by the analysis crates:
//! - **Warning System** - colored terminal output for correctness smells
//! - **Fingerprints** - stable hashes used as cache keys

pub mod fingerprint;
pub mod warning;
