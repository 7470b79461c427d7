//! Result types for an aggregation run.

use crate::listing::{Listing, Source};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How one adapter fared within an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: Source,

    /// Listings contributed (zero when the adapter degraded).
    pub count: usize,

    pub duration_ms: u64,

    /// The outer per-source bound elapsed before the adapter finished.
    pub timed_out: bool,
}

/// Merged result of one aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateOutcome {
    /// The trimmed query text.
    pub query: String,

    /// Listings in completion order; each source's listings are contiguous.
    pub listings: Vec<Listing>,

    /// One report per adapter, in completion order.
    pub sources: Vec<SourceReport>,

    pub started_at: DateTime<Utc>,

    pub duration_ms: u64,

    /// Time until the first adapter completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_completion_ms: Option<u64>,
}

impl AggregateOutcome {
    pub fn new(query: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            query: query.into(),
            listings: Vec::new(),
            sources: Vec::new(),
            started_at,
            duration_ms: 0,
            first_completion_ms: None,
        }
    }

    /// Append one adapter's contribution.
    pub fn add_source(&mut self, report: SourceReport, listings: Vec<Listing>) {
        self.sources.push(report);
        self.listings.extend(listings);
    }

    pub fn total(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Sources that contributed at least one listing.
    pub fn contributing_sources(&self) -> Vec<Source> {
        self.sources
            .iter()
            .filter(|r| r.count > 0)
            .map(|r| r.source)
            .collect()
    }
}
