use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::headlines::{FeedMode, FeedSource, PipelineOptions};

const DATA_DIR: &str = "dosfronteras";

const DEFAULT_FEEDS: &[(&str, &str)] = &[
    ("MMA Junkie", "https://mmajunkie.usatoday.com/feed"),
    ("MMA Fighting", "https://www.mmafighting.com/rss/current"),
    ("Sherdog", "https://www.sherdog.com/rss/news.xml"),
    ("Bloody Elbow", "https://www.bloodyelbow.com/rss/current"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_mode: FeedMode,
    pub feeds: Vec<FeedSource>,
    pub rss2json_api_key: Option<String>,
    pub feed_timeout: Duration,
    pub feed_delay: Duration,
    pub per_source: usize,
    pub max_headlines: usize,
    pub stale_after: Duration,
    pub refresh_interval: Duration,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `.env.local` / `.env` if present, then reads `DF_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let feed_mode = lookup("DF_FEED_MODE")
            .and_then(|val| FeedMode::parse(&val))
            .unwrap_or(FeedMode::Rss2Json);
        let feeds = lookup("DF_FEED_URLS")
            .map(|val| parse_feed_list(&val))
            .filter(|feeds| !feeds.is_empty())
            .unwrap_or_else(default_feeds);
        let rss2json_api_key = lookup("DF_RSS2JSON_API_KEY")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty());
        let feed_timeout = Duration::from_secs(
            lookup("DF_FEED_TIMEOUT_SECS")
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(8)
                .clamp(2, 60),
        );
        let feed_delay = Duration::from_millis(
            lookup("DF_FEED_DELAY_MS")
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(500)
                .min(10_000),
        );
        let per_source = lookup("DF_HEADLINES_PER_SOURCE")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(5)
            .clamp(1, 20);
        let max_headlines = lookup("DF_HEADLINES_MAX")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(15)
            .clamp(1, 100);
        let stale_after = Duration::from_secs(
            lookup("DF_HEADLINES_STALE_SECS")
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(300)
                .max(30),
        );
        let refresh_interval = Duration::from_secs(
            lookup("DF_HEADLINES_POLL_SECS")
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(300)
                .max(30),
        );
        let data_dir = lookup("DF_DATA_DIR")
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| default_data_dir(&lookup));

        Self {
            feed_mode,
            feeds,
            rss2json_api_key,
            feed_timeout,
            feed_delay,
            per_source,
            max_headlines,
            stale_after,
            refresh_interval,
            data_dir,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            per_source: self.per_source,
            max_total: self.max_headlines,
            delay: self.feed_delay,
        }
    }
}

pub fn default_feeds() -> Vec<FeedSource> {
    DEFAULT_FEEDS
        .iter()
        .map(|(name, url)| FeedSource::new(*name, *url))
        .collect()
}

/// `Name|url,Name|url`. Entries without a name use the url as the name.
fn parse_feed_list(raw: &str) -> Vec<FeedSource> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            match entry.split_once('|') {
                Some((name, url)) if !url.trim().is_empty() => {
                    let name = if name.trim().is_empty() { url } else { name };
                    Some(FeedSource::new(name.trim(), url.trim()))
                }
                Some(_) => None,
                None => Some(FeedSource::new(entry, entry)),
            }
        })
        .collect()
}

fn default_data_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(base) = lookup("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(DATA_DIR));
        }
    }
    let home = lookup("HOME")?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR),
    )
}
