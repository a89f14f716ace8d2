//! Type definitions for the news module.

use serde::Serialize;
use tokio::time::Duration;

/// One grounding fact derived from a feed entry. Within a single request no
/// two records share a title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FactRecord {
    /// Entry title, verbatim. Never empty.
    pub title: String,
    /// Publish date as `YYYY-MM-DD`, or empty when unknown.
    pub date: String,
    /// Entry link, or empty when none was usable.
    pub link: String,
}

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
