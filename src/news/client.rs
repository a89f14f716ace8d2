//! HTTP client side of news retrieval: query construction and fetching.

use anyhow::{anyhow, Result};
use reqwest::header;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use super::parser::{cap_and_dedupe, parse_feed};
use super::types::{FactRecord, REQUEST_TIMEOUT};
use crate::environment::Config;
use crate::request::StyleRequest;
use crate::TARGET_WEB_REQUEST;

/// Build the feed search URL for a request: theme and keywords joined into
/// one query, constrained to the last `recencyDays` days, with the
/// configured language/region hints.
pub fn build_search_url(config: &Config, request: &StyleRequest) -> Result<Url> {
    let mut terms: Vec<&str> = Vec::new();
    if !request.theme.trim().is_empty() {
        terms.push(request.theme.trim());
    }
    terms.extend(
        request
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty()),
    );

    let query = format!("{} when:{}d", terms.join(" "), request.recency_days.max(1));

    let mut url = Url::parse(&config.news_endpoint)?;
    url.query_pairs_mut()
        .append_pair("q", &query)
        .append_pair("hl", &config.news_language)
        .append_pair("gl", &config.news_region)
        .append_pair("ceid", &config.news_ceid());
    Ok(url)
}

/// Retrieve recent facts for a current-mode request.
///
/// Degrades gracefully: any network or parse failure is logged and yields an
/// empty fact list, so generation proceeds ungrounded instead of failing the
/// whole request. Some earlier handler variants propagated the failure; this
/// pipeline deliberately favors availability.
pub async fn fetch_recent_facts(
    http: &reqwest::Client,
    config: &Config,
    request: &StyleRequest,
) -> Vec<FactRecord> {
    match try_fetch(http, config, request).await {
        Ok(facts) => {
            debug!(target: TARGET_WEB_REQUEST, "Retrieved {} facts for theme {}", facts.len(), request.theme);
            facts
        }
        Err(err) => {
            warn!(target: TARGET_WEB_REQUEST, "News retrieval failed, continuing ungrounded: {}", err);
            Vec::new()
        }
    }
}

async fn try_fetch(
    http: &reqwest::Client,
    config: &Config,
    request: &StyleRequest,
) -> Result<Vec<FactRecord>> {
    let url = build_search_url(config, request)?;

    debug!(target: TARGET_WEB_REQUEST, "Loading news feed from {}", url);

    let response = timeout(
        REQUEST_TIMEOUT,
        http.get(url.clone())
            .header(
                header::ACCEPT,
                "application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9",
            )
            .send(),
    )
    .await
    .map_err(|_| anyhow!("news request timed out after {}s", REQUEST_TIMEOUT.as_secs()))??;

    if !response.status().is_success() {
        return Err(anyhow!("news feed returned status {}", response.status()));
    }

    let body = response.text().await?;
    let records = parse_feed(&body)?;
    Ok(cap_and_dedupe(records, request.max_articles))
}
