// src/checker/mod.rs
// =============================================================================
// This module contains the status-checking capability.
//
// Contents:
// - StatusChecker: the trait the manager drives; async and fallible
// - serp: the real implementation that fetches and classifies a
//   search-engine results page
//
// The manager in src/manager/ only ever sees the trait, which is what lets
// the tests there substitute deterministic fakes for the network.
//
// Rust concepts:
// - Traits: An interface the manager can be generic over
// - async-trait: Async methods in traits, object-safe and Send
// =============================================================================

mod serp;

pub use serp::SerpChecker;

use crate::manager::IndexStatus;
use anyhow::Result;
use async_trait::async_trait;

/// The external capability that decides whether a URL is indexed.
///
/// Implementations resolve to `Indexed` or `NotIndexed`; they never return
/// `Pending` or `Checking`. An `Err` means the check itself could not be
/// carried out — the manager maps that to `NotIndexed` rather than leaving
/// the record stuck in `Checking`.
#[async_trait]
pub trait StatusChecker: Send + Sync {
    /// Checks whether the given normalized URL is indexed.
    async fn check(&self, url: &str) -> Result<IndexStatus>;
}
