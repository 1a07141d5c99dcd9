use std::sync::mpsc;
use std::time::Duration;

use dosfronteras::feed_parse::FeedItem;
use dosfronteras::headlines::{FeedError, FeedFetcher, FeedSource, PipelineOptions};
use dosfronteras::provider::{ProviderSettings, spawn_provider_with, startup_commands};
use dosfronteras::state::{AppState, Delta, ProviderCommand};

struct OneItem;

impl FeedFetcher for OneItem {
    fn fetch(&self, source: &FeedSource, _limit: usize) -> Result<Vec<FeedItem>, FeedError> {
        Ok(vec![FeedItem {
            title: format!("{} headline", source.name),
            link: "https://example.com/a".to_string(),
            pub_date: None,
            description: "Body".to_string(),
            thumbnail: None,
        }])
    }
}

struct Offline;

impl FeedFetcher for Offline {
    fn fetch(&self, _source: &FeedSource, _limit: usize) -> Result<Vec<FeedItem>, FeedError> {
        Err(FeedError::Timeout)
    }
}

fn settings() -> ProviderSettings {
    ProviderSettings {
        sources: vec![FeedSource::new("Alpha", "https://alpha.example/feed")],
        options: PipelineOptions {
            per_source: 5,
            max_total: 15,
            delay: Duration::ZERO,
        },
        refresh_interval: Duration::from_secs(3600),
        defer_first_refresh: true,
    }
}

#[test]
fn startup_refreshes_missing_or_stale_data() {
    let five_min = Duration::from_secs(300);
    let state = AppState::new();
    assert_eq!(
        startup_commands(&state, 1_000_000, five_min),
        vec![ProviderCommand::RefreshHeadlines, ProviderCommand::FetchNews]
    );

    let mut cached = AppState::new();
    cached.news = dosfronteras::catalog::sample_news();
    cached.headlines = dosfronteras::headlines::mock_headlines_for("Alpha", 0, 2);
    cached.headlines_updated_at = Some(1_000_000 - 60_000);
    assert!(startup_commands(&cached, 1_000_000, five_min).is_empty());

    cached.headlines_updated_at = Some(0);
    assert_eq!(
        startup_commands(&cached, 1_000_000, five_min),
        vec![ProviderCommand::RefreshHeadlines]
    );
}

#[test]
fn provider_answers_commands() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_provider_with(Box::new(OneItem), settings(), tx, cmd_rx);

    cmd_tx.send(ProviderCommand::RefreshHeadlines).expect("send");
    let timeout = Duration::from_secs(5);
    assert!(matches!(rx.recv_timeout(timeout), Ok(Delta::HeadlinesLoading)));

    let batch = loop {
        match rx.recv_timeout(timeout).expect("delta") {
            Delta::SetHeadlines(batch) => break batch,
            Delta::Log(_) => continue,
            other => panic!("unexpected delta {other:?}"),
        }
    };
    assert_eq!(batch.headlines.len(), 1);
    assert_eq!(batch.headlines[0].text, "Alpha headline");
    assert!(batch.failed_sources.is_empty());

    cmd_tx.send(ProviderCommand::FetchNews).expect("send");
    match rx.recv_timeout(timeout).expect("delta") {
        Delta::SeedNews(news) => {
            assert_eq!(news.len(), 1);
            assert_eq!(news[0].tags, vec!["Alpha", "MMA"]);
        }
        other => panic!("unexpected delta {other:?}"),
    }

    drop(cmd_tx);
    handle.join().expect("provider thread");
}

#[test]
fn total_failure_is_reported_on_the_console() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_provider_with(Box::new(Offline), settings(), tx, cmd_rx);

    cmd_tx.send(ProviderCommand::RefreshHeadlines).expect("send");
    let timeout = Duration::from_secs(5);
    let mut logs = Vec::new();
    let batch = loop {
        match rx.recv_timeout(timeout).expect("delta") {
            Delta::SetHeadlines(batch) => break batch,
            Delta::Log(msg) => logs.push(msg),
            Delta::HeadlinesLoading => continue,
            other => panic!("unexpected delta {other:?}"),
        }
    };
    assert_eq!(batch.failed_sources, vec!["Alpha"]);
    assert!(!batch.headlines.is_empty());
    assert!(logs.iter().any(|l| l.starts_with("[WARN] Every headline source failed")));

    drop(cmd_tx);
    handle.join().expect("provider thread");
}
