//! News retrieval for current-events mode.
//!
//! Fetches recent items from a Google-News-style RSS search endpoint and
//! turns them into dated, linkable fact records for prompt grounding.

mod client;
mod parser;
mod types;

pub use self::client::{build_search_url, fetch_recent_facts};
pub use self::parser::{cap_and_dedupe, parse_feed};
pub use self::types::*;
