use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::headlines::{self, FeedFetcher, FeedSource, HttpFeedFetcher, PipelineOptions};
use crate::state::{AppState, Delta, ProviderCommand};

const NEWS_LIMIT: usize = 6;

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub sources: Vec<FeedSource>,
    pub options: PipelineOptions,
    pub refresh_interval: Duration,
    /// Whether the first refresh waits a full interval. The caller already
    /// queues a refresh at startup when the cache is stale.
    pub defer_first_refresh: bool,
}

impl ProviderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sources: config.feeds.clone(),
            options: config.pipeline_options(),
            refresh_interval: config.refresh_interval,
            defer_first_refresh: true,
        }
    }
}

/// What the provider should do right after the snapshot is loaded: refresh
/// stale or missing headlines, and fill an empty news list from the feeds.
pub fn startup_commands(state: &AppState, now_ms: i64, stale_after: Duration) -> Vec<ProviderCommand> {
    let mut cmds = Vec::new();
    if state.headlines.is_empty()
        || headlines::needs_refresh(state.headlines_updated_at, now_ms, stale_after)
    {
        cmds.push(ProviderCommand::RefreshHeadlines);
    }
    if state.news.is_empty() {
        cmds.push(ProviderCommand::FetchNews);
    }
    cmds
}

pub fn spawn_provider(config: &Config, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    let fetcher = HttpFeedFetcher::new(config.feed_mode, config.rss2json_api_key.clone());
    let _ = spawn_provider_with(
        Box::new(fetcher),
        ProviderSettings::from_config(config),
        tx,
        cmd_rx,
    );
}

pub fn spawn_provider_with(
    fetcher: Box<dyn FeedFetcher + Send>,
    settings: ProviderSettings,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut last_refresh = if settings.defer_first_refresh {
            Instant::now()
        } else {
            Instant::now()
                .checked_sub(settings.refresh_interval)
                .unwrap_or_else(Instant::now)
        };

        loop {
            let wait = settings
                .refresh_interval
                .checked_sub(last_refresh.elapsed())
                .unwrap_or(Duration::ZERO);

            match cmd_rx.recv_timeout(wait) {
                Ok(ProviderCommand::RefreshHeadlines) => {
                    if !refresh_headlines(fetcher.as_ref(), &settings, &tx, true) {
                        return;
                    }
                    last_refresh = Instant::now();
                }
                Ok(ProviderCommand::FetchNews) => {
                    let news = headlines::news_from_feeds(
                        fetcher.as_ref(),
                        &settings.sources,
                        NEWS_LIMIT,
                        headlines::now_millis(),
                    );
                    if news.is_empty() {
                        let _ = tx.send(Delta::Log(
                            "[WARN] Feed news unavailable, using sample news".to_string(),
                        ));
                    }
                    if tx.send(Delta::SeedNews(news)).is_err() {
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !refresh_headlines(fetcher.as_ref(), &settings, &tx, false) {
                        return;
                    }
                    last_refresh = Instant::now();
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    })
}

// Returns false once the receiving side is gone.
fn refresh_headlines(
    fetcher: &dyn FeedFetcher,
    settings: &ProviderSettings,
    tx: &Sender<Delta>,
    manual: bool,
) -> bool {
    if tx.send(Delta::HeadlinesLoading).is_err() {
        return false;
    }
    if manual {
        let _ = tx.send(Delta::Log("[INFO] Refreshing headlines".to_string()));
    }
    let batch = headlines::aggregate(
        fetcher,
        &settings.sources,
        &settings.options,
        headlines::now_millis(),
    );
    if batch.all_failed(settings.sources.len()) {
        let _ = tx.send(Delta::Log(
            "[WARN] Every headline source failed, showing fallback headlines".to_string(),
        ));
    }
    tx.send(Delta::SetHeadlines(batch)).is_ok()
}
