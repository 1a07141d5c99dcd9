use anyhow::Result;

use dosfronteras::config::Config;
use dosfronteras::headlines::{self, HttpFeedFetcher};
use dosfronteras::http_client;
use dosfronteras::persist;
use dosfronteras::state::AppState;
use dosfronteras::storage::LocalStore;

/// Runs the headline pipeline once. `--save` also writes the result into
/// the local store, as the dashboard would.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let save = std::env::args().skip(1).any(|a| a == "--save");
    let config = Config::from_env();
    http_client::init_http_client(config.feed_timeout)?;

    let fetcher = HttpFeedFetcher::new(config.feed_mode, config.rss2json_api_key.clone());
    let batch = headlines::aggregate(
        &fetcher,
        &config.feeds,
        &config.pipeline_options(),
        headlines::now_millis(),
    );

    for h in &batch.headlines {
        let date = h
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{date:<16} {:<14} {}", h.source, h.text);
    }
    if batch.all_failed(config.feeds.len()) {
        println!("every source failed; these are the fallback headlines");
    } else if !batch.failed_sources.is_empty() {
        println!("fell back: {}", batch.failed_sources.join(", "));
    }

    if save {
        let mut store = LocalStore::open_or_memory(config.data_dir.as_deref());
        let mut state = AppState::new();
        persist::load_into_state(&mut state, &store);
        state.set_headlines(batch);
        persist::save_from_state(&state, &mut store)?;
    }
    Ok(())
}
