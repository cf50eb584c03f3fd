// src/manager/record.rs
// =============================================================================
// Data model for tracked links.
//
// Key types:
// - IndexStatus: the four states a tracked URL moves through
// - LinkRecord: one tracked URL with its derived site: query URL
// - Stats: aggregate counts over a record collection
//
// The query URL is always derived from the original URL with query_url_for();
// it is never stored independently of that derivation, so re-deriving it at
// any later time yields the identical string.
//
// Rust concepts:
// - Enums: To represent the check states
// - Derive macros: Serialize/Deserialize for JSON output, Debug for printing
// - Pure functions: query_url_for has no state and no side effects
// =============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// The search endpoint the site: queries are built against
const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

// The index-check state of a single tracked URL
//
// Records start out Pending, flip to Checking while an external call is in
// flight, and end up Indexed or NotIndexed (either from the checker or from
// a manual override).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    /// Not checked yet
    Pending,
    /// A check is currently in flight
    Checking,
    /// The search engine knows this URL
    Indexed,
    /// The search engine does not know this URL
    NotIndexed,
}

impl IndexStatus {
    /// The fixed literal used for this status in the raw export
    ///
    /// These tokens are part of the export format and must not change:
    /// downstream spreadsheets key off them.
    pub fn export_token(&self) -> &'static str {
        match self {
            IndexStatus::Indexed => "INDEXED",
            IndexStatus::NotIndexed => "NO",
            IndexStatus::Checking => "Checking",
            IndexStatus::Pending => "Pending",
        }
    }
}

// One tracked URL
//
// The id is a random 128-bit UUID, generated once at creation and stable for
// the record's lifetime. Display position is not stored here: numbering is
// positional and shifts when earlier records are removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Unique, stable identifier for this record
    pub id: Uuid,
    /// The normalized absolute URL being tracked
    pub original_url: String,
    /// The search-engine query URL for "site:<original_url>"
    pub query_url: String,
    /// Current check state
    pub status: IndexStatus,
}

impl LinkRecord {
    /// Creates a new Pending record for an already-normalized URL
    pub fn new(original_url: String) -> Self {
        let query_url = query_url_for(&original_url);
        LinkRecord {
            id: Uuid::new_v4(),
            original_url,
            query_url,
            status: IndexStatus::Pending,
        }
    }
}

// Derives the search-engine query URL for a tracked URL
//
// The query term is "site:<url>", percent-encoded as a query-string value.
// This is a pure function of its input: same URL in, same query URL out,
// every time.
pub fn query_url_for(original_url: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &format!("site:{}", original_url))
        .finish();

    format!("{}?{}", SEARCH_ENDPOINT, query)
}

// Aggregate counts over the record collection
//
// Computed fresh on every call to LinkListManager::stats(), never cached.
// Pending and Checking records count toward total only, so
// indexed + not_indexed <= total always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of records in the collection
    pub total: usize,
    /// Records currently marked Indexed
    pub indexed: usize,
    /// Records currently marked NotIndexed
    pub not_indexed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_starts_pending() {
        let record = LinkRecord::new("https://example.com".to_string());
        assert_eq!(record.status, IndexStatus::Pending);
        assert_eq!(record.original_url, "https://example.com");
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = LinkRecord::new("https://example.com".to_string());
        let b = LinkRecord::new("https://example.com".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_query_url_embeds_encoded_site_term() {
        let url = query_url_for("https://example.com/page");
        assert_eq!(
            url,
            "https://www.google.com/search?q=site%3Ahttps%3A%2F%2Fexample.com%2Fpage"
        );
    }

    #[test]
    fn test_query_url_is_deterministic() {
        let record = LinkRecord::new("https://example.com/a?b=c".to_string());
        // Re-deriving from the stored URL must reproduce the stored query URL
        assert_eq!(record.query_url, query_url_for(&record.original_url));
        assert_eq!(
            query_url_for(&record.original_url),
            query_url_for(&record.original_url)
        );
    }

    #[test]
    fn test_export_tokens() {
        assert_eq!(IndexStatus::Indexed.export_token(), "INDEXED");
        assert_eq!(IndexStatus::NotIndexed.export_token(), "NO");
        assert_eq!(IndexStatus::Checking.export_token(), "Checking");
        assert_eq!(IndexStatus::Pending.export_token(), "Pending");
    }
}
