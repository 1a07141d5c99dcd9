use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed_parse::{self, FeedItem};
use crate::http_client::http_client;
use crate::state::NewsItem;

pub const HEADLINE_MAX_CHARS: usize = 100;
pub const NEWS_SUMMARY_MAX_CHARS: usize = 200;
pub const FALLBACK_SOURCE: &str = "Dos Fronteras";

const RSS2JSON_ENDPOINT: &str = "https://api.rss2json.com/v1/api.json";
const BROWSER_UA: &str = "Mozilla/5.0 (compatible; dosfronteras/0.1)";

const MOCK_TEXTS: &[&str] = &[
    "Title fight set to headline next month's pay-per-view card",
    "Former champion eyes return after injury layoff",
    "Rising prospect extends unbeaten streak with first-round finish",
    "Promotion confirms new date for rescheduled main event",
    "Coach breaks down game plan ahead of rematch",
    "Undercard bout added as fight week approaches",
    "Judges' scorecards spark debate after split decision",
    "Veteran announces retirement after twenty-fight career",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("http {0}")]
    Http(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("feed returned no usable items")]
    Empty,
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else if let Some(status) = err.status() {
            FeedError::Http(status.as_u16())
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// GET the syndication document and parse it locally.
    Direct,
    /// GET the third-party feed-to-JSON conversion endpoint.
    Rss2Json,
}

impl FeedMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" | "rss" | "xml" => Some(FeedMode::Direct),
            "rss2json" | "json" => Some(FeedMode::Rss2Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub source: String,
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineBatch {
    pub headlines: Vec<Headline>,
    /// Unix millis.
    pub fetched_at: i64,
    pub failed_sources: Vec<String>,
}

impl HeadlineBatch {
    pub fn all_failed(&self, sources: usize) -> bool {
        sources == 0 || self.failed_sources.len() >= sources
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub per_source: usize,
    pub max_total: usize,
    /// Pause between consecutive sources.
    pub delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            per_source: 5,
            max_total: 15,
            delay: Duration::from_millis(500),
        }
    }
}

pub trait FeedFetcher {
    fn fetch(&self, source: &FeedSource, limit: usize) -> Result<Vec<FeedItem>, FeedError>;
}

pub struct HttpFeedFetcher {
    mode: FeedMode,
    api_key: Option<String>,
    endpoint: String,
    client: Option<Client>,
}

impl HttpFeedFetcher {
    pub fn new(mode: FeedMode, api_key: Option<String>) -> Self {
        Self {
            mode,
            api_key,
            endpoint: RSS2JSON_ENDPOINT.to_string(),
            client: None,
        }
    }

    /// Points rss2json mode at another conversion endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Uses `client` instead of the shared one.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub(crate) fn request_url(&self, source: &FeedSource, limit: usize) -> Result<String, FeedError> {
        match self.mode {
            FeedMode::Direct => Ok(source.url.clone()),
            FeedMode::Rss2Json => {
                let mut params = vec![("rss_url".to_string(), source.url.clone())];
                // The free tier rejects `count` without a key.
                if let Some(key) = self.api_key.as_ref() {
                    params.push(("api_key".to_string(), key.clone()));
                    params.push(("count".to_string(), limit.to_string()));
                }
                url::Url::parse_with_params(&self.endpoint, &params)
                    .map(String::from)
                    .map_err(|err| FeedError::Malformed(format!("bad feed url: {err}")))
            }
        }
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn fetch(&self, source: &FeedSource, limit: usize) -> Result<Vec<FeedItem>, FeedError> {
        let client = match self.client.as_ref() {
            Some(client) => client,
            None => http_client().map_err(|err| FeedError::Network(format!("{err:#}")))?,
        };
        let url = self.request_url(source, limit)?;

        let accept = match self.mode {
            FeedMode::Direct => "application/rss+xml, application/atom+xml, text/xml, */*",
            FeedMode::Rss2Json => "application/json",
        };
        let resp = client
            .get(&url)
            .header(USER_AGENT, BROWSER_UA)
            .header(ACCEPT, accept)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Http(status.as_u16()));
        }
        let body = resp.text()?;

        let mut items = match self.mode {
            FeedMode::Direct => feed_parse::parse_rss(&body)?,
            FeedMode::Rss2Json => feed_parse::parse_rss2json(&body)?,
        };
        items.truncate(limit);
        if items.is_empty() {
            return Err(FeedError::Empty);
        }
        Ok(items)
    }
}

/// Runs every source in order, substituting the mock list for any source
/// that fails. The result is never empty.
pub fn aggregate(
    fetcher: &dyn FeedFetcher,
    sources: &[FeedSource],
    opts: &PipelineOptions,
    now_ms: i64,
) -> HeadlineBatch {
    if sources.is_empty() {
        return HeadlineBatch {
            headlines: fallback_headlines(sources, opts),
            fetched_at: now_ms,
            failed_sources: Vec::new(),
        };
    }

    let mut combined = Vec::with_capacity(sources.len() * opts.per_source);
    let mut failed_sources = Vec::new();
    for (idx, source) in sources.iter().enumerate() {
        if idx > 0 && !opts.delay.is_zero() {
            thread::sleep(opts.delay);
        }
        match fetch_source(fetcher, source, opts.per_source) {
            Ok(items) => combined.extend(items),
            Err(err) => {
                warn!("headline source {} failed: {err}; using mock headlines", source.name);
                failed_sources.push(source.name.clone());
                combined.extend(mock_headlines_for(&source.name, idx, opts.per_source));
            }
        }
    }

    let headlines = finalize(combined, opts.max_total);
    info!(
        "headlines refreshed: {} items, {} of {} sources fell back",
        headlines.len(),
        failed_sources.len(),
        sources.len()
    );
    HeadlineBatch {
        headlines,
        fetched_at: now_ms,
        failed_sources,
    }
}

fn fetch_source(
    fetcher: &dyn FeedFetcher,
    source: &FeedSource,
    limit: usize,
) -> Result<Vec<Headline>, FeedError> {
    let items = fetcher.fetch(source, limit)?;
    let headlines: Vec<Headline> = items
        .into_iter()
        .take(limit)
        .filter_map(|item| headline_from_item(&source.name, item))
        .collect();
    if headlines.is_empty() {
        return Err(FeedError::Empty);
    }
    Ok(headlines)
}

fn headline_from_item(source: &str, item: FeedItem) -> Option<Headline> {
    let text = item.title.trim();
    if text.is_empty() {
        return None;
    }
    Some(Headline {
        source: source.to_string(),
        text: truncate_text(text, HEADLINE_MAX_CHARS),
        url: item.link,
        date: item.pub_date,
    })
}

/// The result of a run where every source failed.
pub fn fallback_headlines(sources: &[FeedSource], opts: &PipelineOptions) -> Vec<Headline> {
    let combined: Vec<Headline> = if sources.is_empty() {
        mock_headlines_for(FALLBACK_SOURCE, 0, opts.per_source)
    } else {
        sources
            .iter()
            .enumerate()
            .flat_map(|(idx, source)| mock_headlines_for(&source.name, idx, opts.per_source))
            .collect()
    };
    finalize(combined, opts.max_total)
}

/// Static headlines stamped with `source`. `offset` rotates the text table
/// so neighbouring sources do not repeat each other.
pub fn mock_headlines_for(source: &str, offset: usize, count: usize) -> Vec<Headline> {
    (0..count)
        .map(|i| {
            let text = MOCK_TEXTS[(offset + i) % MOCK_TEXTS.len()];
            let hour = 20u32.saturating_sub(i as u32 % 20);
            Headline {
                source: source.to_string(),
                text: text.to_string(),
                url: String::new(),
                date: Utc.with_ymd_and_hms(2025, 10, 28, hour, 0, 0).single(),
            }
        })
        .collect()
}

/// Dedupes by (text, source) keeping the first, orders newest first with
/// undated entries last, then caps the list.
pub fn finalize(headlines: Vec<Headline>, max_total: usize) -> Vec<Headline> {
    let mut seen = HashSet::with_capacity(headlines.len());
    let mut out: Vec<Headline> = headlines
        .into_iter()
        .filter(|h| seen.insert((h.text.clone(), h.source.clone())))
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out.truncate(max_total);
    out
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

/// True when the cache is missing or older than `threshold`.
pub fn needs_refresh(last_update_ms: Option<i64>, now_ms: i64, threshold: Duration) -> bool {
    let Some(last) = last_update_ms else {
        return true;
    };
    let threshold_ms = i64::try_from(threshold.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(last) > threshold_ms
}

/// Builds news cards from the first feed that answers. Returns an empty list
/// when none do; callers seed the sample news in that case.
pub fn news_from_feeds(
    fetcher: &dyn FeedFetcher,
    sources: &[FeedSource],
    limit: usize,
    now_ms: i64,
) -> Vec<NewsItem> {
    for source in sources {
        let items = match fetcher.fetch(source, limit) {
            Ok(items) => items,
            Err(err) => {
                warn!("news source {} failed: {err}", source.name);
                continue;
            }
        };
        let news: Vec<NewsItem> = items
            .into_iter()
            .take(limit)
            .enumerate()
            .filter_map(|(idx, item)| news_from_item(&source.name, item, idx, now_ms))
            .collect();
        if !news.is_empty() {
            return news;
        }
    }
    Vec::new()
}

fn news_from_item(source: &str, item: FeedItem, idx: usize, now_ms: i64) -> Option<NewsItem> {
    let title = item.title.trim();
    if title.is_empty() {
        return None;
    }
    let date = item
        .pub_date
        .or_else(|| DateTime::from_timestamp_millis(now_ms))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    Some(NewsItem {
        id: format!("news-{now_ms}-{idx}"),
        title: title.to_string(),
        summary: truncate_text(&item.description, NEWS_SUMMARY_MAX_CHARS),
        date,
        tags: vec![source.to_string(), "MMA".to_string()],
        thumb: item.thumbnail,
    })
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
