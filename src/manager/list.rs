// src/manager/list.rs
// =============================================================================
// The link-list manager: an ordered, in-memory collection of tracked URLs
// plus the operations that drive it.
//
// How it works:
// 1. parse_and_append() turns pasted text into Pending records
// 2. check_all() sweeps the Pending records, one external call at a time
// 3. check_one() / set_status() / remove() / clear() mutate single records
// 4. stats() / export_text() / records() are read-only derived views
//
// Concurrency model:
// - The collection lives behind Arc<Mutex<..>> and the lock is only held for
//   short synchronous sections, never across an await point
// - The only suspension is the checker call inside check_one(); removals and
//   overrides can interleave with it, so the write-back re-validates that the
//   record still exists before touching it
// - The sweep is strictly sequential: one checker call in flight at a time
//
// Rust concepts:
// - Interior mutability: &self methods that mutate through a Mutex
// - Generics: the checker is an injected type parameter, swapped for a
//   deterministic fake in the tests below
// - Atomics: the sweep-in-progress flag
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::checker::StatusChecker;

use super::record::{IndexStatus, LinkRecord, Stats};

// Parses raw pasted text into link records, without appending them anywhere
//
// Rules (in order, per line):
// 1. Trim surrounding whitespace; drop empty lines
// 2. Keep only lines starting with the literal "http" or "www"
//    (case-sensitive); everything else is silently dropped
// 3. Lines that don't start with "http" get an "https://" prefix
//
// No further validation happens: a malformed URL that passes the prefix
// check is tracked as-is.
pub fn parse_links(raw_text: &str) -> Vec<LinkRecord> {
    raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match normalize_line(line) {
            Some(url) => Some(LinkRecord::new(url)),
            None => {
                log::debug!("ignoring non-URL line: {:?}", line);
                None
            }
        })
        .collect()
}

// Applies the normalization rule to one trimmed, non-empty line
//
// Returns None for lines that are not URL candidates at all.
fn normalize_line(line: &str) -> Option<String> {
    if line.starts_with("http") {
        Some(line.to_string())
    } else if line.starts_with("www") {
        Some(format!("https://{}", line))
    } else {
        None
    }
}

// Owns the ordered record collection and drives status checks through an
// injected checker
//
// All methods take &self: the collection sits behind a Mutex so that an
// in-flight check (suspended inside check_one) can coexist with removals,
// overrides, and reads issued from elsewhere.
pub struct LinkListManager<C> {
    /// The ordered collection; insertion order is display order
    links: Arc<Mutex<Vec<LinkRecord>>>,
    /// The injected URL -> status capability
    checker: Arc<C>,
    /// True while a check_all() sweep is running
    sweeping: Arc<AtomicBool>,
}

// Cloning is cheap: every clone shares the same collection, checker, and
// sweep flag, so a clone can be moved into a spawned task while the original
// keeps serving reads. (Hand-written because deriving Clone would demand
// C: Clone, which the checker doesn't need to be.)
impl<C> Clone for LinkListManager<C> {
    fn clone(&self) -> Self {
        LinkListManager {
            links: Arc::clone(&self.links),
            checker: Arc::clone(&self.checker),
            sweeping: Arc::clone(&self.sweeping),
        }
    }
}

impl<C: StatusChecker> LinkListManager<C> {
    /// Creates an empty manager around the given checker
    pub fn new(checker: C) -> Self {
        LinkListManager {
            links: Arc::new(Mutex::new(Vec::new())),
            checker: Arc::new(checker),
            sweeping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Parses raw text and appends the resulting records to the collection
    ///
    /// Returns clones of the records that were appended, in order. Blank or
    /// whitespace-only input appends nothing and returns an empty vec, which
    /// is how callers tell a successful submission from a no-op (the input
    /// buffer they own should only be cleared on success).
    ///
    /// There is no deduplication: pasting the same URL twice yields two
    /// independent records with distinct ids.
    pub fn parse_and_append(&self, raw_text: &str) -> Vec<LinkRecord> {
        let appended = parse_links(raw_text);

        if !appended.is_empty() {
            let mut links = self.lock_links();
            links.extend(appended.iter().cloned());
        }

        appended
    }

    /// Checks one record against the search engine's index
    ///
    /// The record flips to Checking before the external call starts, so the
    /// in-flight state is observable. When the call resolves, the record is
    /// looked up again by id: it may have been removed in the meantime, and
    /// a removed record must not be resurrected by a late result.
    ///
    /// A checker error is mapped to NotIndexed so no record can get stuck in
    /// Checking forever. Unknown ids are a benign no-op.
    pub async fn check_one(&self, id: Uuid) {
        // Mark Checking and grab the URL inside one short critical section.
        let url = {
            let mut links = self.lock_links();
            match links.iter_mut().find(|link| link.id == id) {
                Some(link) => {
                    link.status = IndexStatus::Checking;
                    link.original_url.clone()
                }
                // Already removed, nothing to check
                None => return,
            }
        };

        // The lock is released here; the rest of the system stays responsive
        // while this call is in flight.
        let status = match self.checker.check(&url).await {
            Ok(status) => status,
            Err(e) => {
                log::warn!("index check failed for {}: {:#}", url, e);
                IndexStatus::NotIndexed
            }
        };

        // Re-validate existence before writing back. Last-writer-wins against
        // a concurrent manual override.
        let mut links = self.lock_links();
        if let Some(link) = links.iter_mut().find(|link| link.id == id) {
            link.status = status;
        }
    }

    /// Sweeps the collection, checking every record that is still Pending
    ///
    /// The eligible set is snapshotted up front: records that are already
    /// Checking, Indexed, or NotIndexed are skipped, which makes the sweep
    /// resumable. Checks run strictly one at a time; the next check only
    /// starts once the previous one has resolved.
    ///
    /// While a sweep is running is_sweeping() reports true, and a second
    /// check_all() call returns immediately without checking anything.
    pub async fn check_all(&self) {
        if self.sweeping.swap(true, Ordering::SeqCst) {
            // A sweep is already running
            return;
        }

        let eligible: Vec<Uuid> = {
            let links = self.lock_links();
            links
                .iter()
                .filter(|link| link.status == IndexStatus::Pending)
                .map(|link| link.id)
                .collect()
        };

        for id in eligible {
            self.check_one(id).await;
        }

        self.sweeping.store(false, Ordering::SeqCst);
    }

    /// True while a check_all() sweep is in progress
    pub fn is_sweeping(&self) -> bool {
        self.sweeping.load(Ordering::SeqCst)
    }

    /// Overwrites a record's status directly, bypassing the checker
    ///
    /// Used when a human classifies a result by eye after opening the query
    /// URL in a browser. Unknown ids are a benign no-op.
    pub fn set_status(&self, id: Uuid, status: IndexStatus) {
        let mut links = self.lock_links();
        if let Some(link) = links.iter_mut().find(|link| link.id == id) {
            link.status = status;
        }
    }

    /// Removes a record; unknown ids are a benign no-op
    ///
    /// Later records shift up one display position. Ids never change.
    pub fn remove(&self, id: Uuid) {
        let mut links = self.lock_links();
        links.retain(|link| link.id != id);
    }

    /// Empties the collection unconditionally
    ///
    /// Whether to ask the user "are you sure?" first is the caller's job.
    pub fn clear(&self) {
        let mut links = self.lock_links();
        links.clear();
    }

    /// Ordered snapshot of the collection, for display
    pub fn records(&self) -> Vec<LinkRecord> {
        self.lock_links().clone()
    }

    /// Aggregate counts, computed fresh from the current collection
    pub fn stats(&self) -> Stats {
        let links = self.lock_links();
        Stats {
            total: links.len(),
            indexed: links
                .iter()
                .filter(|link| link.status == IndexStatus::Indexed)
                .count(),
            not_indexed: links
                .iter()
                .filter(|link| link.status == IndexStatus::NotIndexed)
                .count(),
        }
    }

    /// The raw results payload: one status token per record, in order
    ///
    /// Lines are joined with a single newline and there is no trailing
    /// newline. This is the string a caller copies to the clipboard.
    pub fn export_text(&self) -> String {
        let links = self.lock_links();
        links
            .iter()
            .map(|link| link.status.export_token())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn lock_links(&self) -> std::sync::MutexGuard<'_, Vec<LinkRecord>> {
        self.links.lock().expect("link list mutex poisoned")
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why &self everywhere instead of &mut self?
//    - While check_one() is suspended waiting on the network, the caller may
//      want to remove records or read stats
//    - With &mut self those calls could not even be expressed (exclusive
//      borrow); with &self + Mutex they can interleave safely
//
// 2. Why std::sync::Mutex and not tokio::sync::Mutex?
//    - We never hold the lock across an await, so the cheap synchronous
//      Mutex is the right tool
//    - The async Mutex is only needed when a lock must survive a suspension
//
// 3. What does swap(true) do on the AtomicBool?
//    - Sets the flag to true and returns the previous value in one step
//    - If the previous value was already true, another sweep is running and
//      we back off
//
// 4. Why snapshot the eligible ids before the loop?
//    - The collection can change while the sweep is suspended
//    - Iterating a snapshot of ids (not indices) means removals during the
//      sweep cannot shift us onto the wrong record
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::StatusChecker;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    // A deterministic checker: records the URLs it was asked about, optionally
    // waits on a gate (so tests can interleave other operations with an
    // in-flight check), then returns a fixed status.
    struct FakeChecker {
        result: IndexStatus,
        gate: Option<Arc<Notify>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeChecker {
        fn returning(result: IndexStatus) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let checker = FakeChecker {
                result,
                gate: None,
                calls: calls.clone(),
            };
            (checker, calls)
        }

        fn gated(result: IndexStatus, gate: Arc<Notify>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let checker = FakeChecker {
                result,
                gate: Some(gate),
                calls: calls.clone(),
            };
            (checker, calls)
        }
    }

    #[async_trait]
    impl StatusChecker for FakeChecker {
        async fn check(&self, url: &str) -> Result<IndexStatus> {
            self.calls.lock().unwrap().push(url.to_string());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(self.result)
        }
    }

    // A checker that always fails, for the fallback path
    struct FailingChecker;

    #[async_trait]
    impl StatusChecker for FailingChecker {
        async fn check(&self, _url: &str) -> Result<IndexStatus> {
            Err(anyhow!("search engine quota exhausted"))
        }
    }

    fn manager_returning(
        result: IndexStatus,
    ) -> (LinkListManager<FakeChecker>, Arc<Mutex<Vec<String>>>) {
        let (checker, calls) = FakeChecker::returning(result);
        (LinkListManager::new(checker), calls)
    }

    #[test]
    fn test_parse_keeps_only_url_lines() {
        let (manager, _calls) = manager_returning(IndexStatus::Indexed);

        let appended =
            manager.parse_and_append("https://a.com\nnot a url\n\nwww.b.com");

        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0].original_url, "https://a.com");
        assert_eq!(appended[1].original_url, "https://www.b.com");

        // The collection saw the same two records, in the same order
        let records = manager.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, appended[0].id);
        assert_eq!(records[1].id, appended[1].id);
    }

    #[test]
    fn test_normalize_is_case_sensitive_and_lenient() {
        assert_eq!(
            normalize_line("https://a.com"),
            Some("https://a.com".to_string())
        );
        assert_eq!(
            normalize_line("www.a.com"),
            Some("https://www.a.com".to_string())
        );
        // Prefix check is case-sensitive
        assert_eq!(normalize_line("WWW.a.com"), None);
        assert_eq!(normalize_line("Http://a.com"), None);
        // No validation beyond the prefix: this passes through as-is
        assert_eq!(
            normalize_line("http-not-really-a-url"),
            Some("http-not-really-a-url".to_string())
        );
    }

    #[test]
    fn test_blank_input_is_a_no_op() {
        let (manager, _calls) = manager_returning(IndexStatus::Indexed);

        let appended = manager.parse_and_append("   \n\n\t  \n");

        assert!(appended.is_empty());
        assert_eq!(manager.stats().total, 0);
    }

    #[test]
    fn test_no_deduplication() {
        let (manager, _calls) = manager_returning(IndexStatus::Indexed);

        manager.parse_and_append("https://a.com");
        manager.parse_and_append("https://a.com");

        let records = manager.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original_url, records[1].original_url);
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn test_stats_track_append_override_remove() {
        let (manager, _calls) = manager_returning(IndexStatus::Indexed);

        let appended =
            manager.parse_and_append("https://a.com\nhttps://b.com\nhttps://c.com");
        assert_eq!(
            manager.stats(),
            Stats {
                total: 3,
                indexed: 0,
                not_indexed: 0
            }
        );

        manager.set_status(appended[0].id, IndexStatus::Indexed);
        manager.set_status(appended[1].id, IndexStatus::NotIndexed);
        let stats = manager.stats();
        assert_eq!(
            stats,
            Stats {
                total: 3,
                indexed: 1,
                not_indexed: 1
            }
        );
        assert!(stats.indexed + stats.not_indexed <= stats.total);

        manager.remove(appended[0].id);
        assert_eq!(
            manager.stats(),
            Stats {
                total: 2,
                indexed: 0,
                not_indexed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_sweep_checks_exactly_the_pending_records() {
        let (manager, calls) = manager_returning(IndexStatus::Indexed);

        let appended = manager.parse_and_append(
            "https://a.com\nhttps://b.com\nhttps://c.com\nhttps://d.com",
        );
        manager.set_status(appended[1].id, IndexStatus::Indexed);
        manager.set_status(appended[2].id, IndexStatus::Checking);

        manager.check_all().await;

        // Only the two Pending records were handed to the checker, in order
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["https://a.com".to_string(), "https://d.com".to_string()]
        );

        let records = manager.records();
        assert_eq!(records[0].status, IndexStatus::Indexed);
        assert_eq!(records[1].status, IndexStatus::Indexed);
        // The record that was mid-flight at sweep time was left alone
        assert_eq!(records[2].status, IndexStatus::Checking);
        assert_eq!(records[3].status, IndexStatus::Indexed);
    }

    #[tokio::test]
    async fn test_sweep_flag_clears_even_with_nothing_to_check() {
        let (manager, calls) = manager_returning(IndexStatus::Indexed);

        manager.check_all().await;

        assert!(!manager.is_sweeping());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reentrant_sweep_is_refused() {
        let gate = Arc::new(Notify::new());
        let (checker, calls) = FakeChecker::gated(IndexStatus::Indexed, gate.clone());
        let manager = LinkListManager::new(checker);
        manager.parse_and_append("https://a.com");

        futures::join!(manager.check_all(), async {
            // The first sweep is suspended inside the checker at this point
            assert!(manager.is_sweeping());

            // A second sweep must back off without checking anything
            manager.check_all().await;
            assert_eq!(calls.lock().unwrap().len(), 1);

            gate.notify_one();
        });

        assert!(!manager.is_sweeping());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checking_state_is_visible_while_call_is_in_flight() {
        let gate = Arc::new(Notify::new());
        let (checker, _calls) = FakeChecker::gated(IndexStatus::Indexed, gate.clone());
        let manager = LinkListManager::new(checker);
        let record = manager.parse_and_append("https://a.com")[0].clone();

        futures::join!(manager.check_one(record.id), async {
            assert_eq!(manager.records()[0].status, IndexStatus::Checking);
            gate.notify_one();
        });

        assert_eq!(manager.records()[0].status, IndexStatus::Indexed);
    }

    #[tokio::test]
    async fn test_removal_during_inflight_check_does_not_resurrect() {
        let gate = Arc::new(Notify::new());
        let (checker, _calls) = FakeChecker::gated(IndexStatus::Indexed, gate.clone());
        let manager = LinkListManager::new(checker);
        let record = manager.parse_and_append("https://a.com")[0].clone();

        futures::join!(manager.check_one(record.id), async {
            // Delete the record while its check is still in flight
            manager.remove(record.id);
            gate.notify_one();
        });

        // The late result must not bring the record back
        assert!(manager.records().is_empty());
        assert_eq!(manager.stats().total, 0);
    }

    #[tokio::test]
    async fn test_clone_shares_state_across_tasks() {
        let (manager, _calls) = manager_returning(IndexStatus::Indexed);
        let record = manager.parse_and_append("https://a.com")[0].clone();

        // A clone moved into a spawned task mutates the same collection
        let worker = manager.clone();
        tokio::spawn(async move { worker.check_one(record.id).await })
            .await
            .unwrap();

        assert_eq!(manager.records()[0].status, IndexStatus::Indexed);
    }

    #[tokio::test]
    async fn test_checker_error_falls_back_to_not_indexed() {
        let manager = LinkListManager::new(FailingChecker);
        let record = manager.parse_and_append("https://a.com")[0].clone();

        manager.check_one(record.id).await;

        // Never left stuck in Checking
        assert_eq!(manager.records()[0].status, IndexStatus::NotIndexed);
    }

    #[tokio::test]
    async fn test_stale_id_operations_are_no_ops() {
        let (manager, calls) = manager_returning(IndexStatus::Indexed);
        manager.parse_and_append("https://a.com");
        let stale = Uuid::new_v4();

        manager.check_one(stale).await;
        manager.set_status(stale, IndexStatus::Indexed);
        manager.remove(stale);

        // Nothing was checked, nothing changed
        assert!(calls.lock().unwrap().is_empty());
        let records = manager.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, IndexStatus::Pending);
    }

    #[test]
    fn test_export_uses_fixed_tokens_in_order() {
        let (manager, _calls) = manager_returning(IndexStatus::Indexed);

        let appended = manager.parse_and_append(
            "https://a.com\nhttps://b.com\nhttps://c.com\nhttps://d.com",
        );
        manager.set_status(appended[0].id, IndexStatus::Indexed);
        manager.set_status(appended[1].id, IndexStatus::NotIndexed);
        manager.set_status(appended[2].id, IndexStatus::Checking);

        assert_eq!(manager.export_text(), "INDEXED\nNO\nChecking\nPending");
    }

    #[test]
    fn test_clear_empties_everything() {
        let (manager, _calls) = manager_returning(IndexStatus::Indexed);

        let appended = manager.parse_and_append("https://a.com\nhttps://b.com");
        manager.set_status(appended[0].id, IndexStatus::Indexed);

        manager.clear();

        assert_eq!(
            manager.stats(),
            Stats {
                total: 0,
                indexed: 0,
                not_indexed: 0
            }
        );
        assert_eq!(manager.export_text(), "");
    }
}
