use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use dosfronteras::config::Config;
use dosfronteras::persist;
use dosfronteras::render;
use dosfronteras::state::AppState;
use dosfronteras::storage::LocalStore;

const DEFAULT_OUT: &str = "index.html";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let out = parse_out_arg().unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));
    let config = Config::from_env();
    let store = LocalStore::open_or_memory(config.data_dir.as_deref());

    let mut state = AppState::new();
    persist::load_into_state(&mut state, &store);

    let html = render::render_page(&state, Local::now().date_naive());
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    fs::write(&out, html).with_context(|| format!("write {}", out.display()))?;

    info!(
        "exported {} news, {} events, {} headlines",
        state.news.len(),
        state.events.len(),
        state.headlines.len()
    );
    println!("Wrote {}", out.display());
    Ok(())
}

fn parse_out_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--out=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--out" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
