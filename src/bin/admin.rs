use anyhow::{Context, Result, anyhow, bail};
use log::info;

use dosfronteras::config::Config;
use dosfronteras::embed;
use dosfronteras::headlines::now_millis;
use dosfronteras::persist;
use dosfronteras::state::{AppState, NewsDraft, thumb_data_url};
use dosfronteras::storage::LocalStore;

const USAGE: &str = "usage: admin <command>

commands:
  list
  add-news --title T --summary S --date YYYY-MM-DD [--tags a,b] [--thumb PATH|URL]
  delete-news ID
  add-event --date YYYY-MM-DD --match TEXT
  delete-event ID
  set-featured URL        (empty string clears)
  set-latest URL          (empty string clears)
  resolve URL
  clear-cart";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];

    // Resolving needs no stored state.
    if command == "resolve" {
        let url = positional(rest).context("resolve needs a URL")?;
        match embed::resolve(url) {
            Some(video) => println!("{} {} -> {}", video.provider.label(), video.id, video.locator),
            None => println!("Cannot parse the provided URL"),
        }
        return Ok(());
    }

    let config = Config::from_env();
    let mut store = LocalStore::open_or_memory(config.data_dir.as_deref());
    let mut state = AppState::new();
    persist::load_into_state(&mut state, &store);
    state.admin = true;

    match command {
        "list" => {
            print_state(&state);
            return Ok(());
        }
        "add-news" => {
            let thumb = match flag(rest, "--thumb") {
                Some(raw) => Some(thumb_data_url(raw)?),
                None => None,
            };
            let draft = NewsDraft {
                title: flag(rest, "--title").unwrap_or_default().to_string(),
                summary: flag(rest, "--summary").unwrap_or_default().to_string(),
                date: flag(rest, "--date").unwrap_or_default().to_string(),
                tags: flag(rest, "--tags").unwrap_or_default().to_string(),
                thumb,
            };
            let item = state.add_news(draft, now_millis())?;
            println!("added {} {}", item.id, item.title);
        }
        "delete-news" => {
            let id = positional(rest).context("delete-news needs an id")?;
            let item = state.delete_news(id)?;
            println!("deleted {} {}", item.id, item.title);
        }
        "add-event" => {
            let date = flag(rest, "--date").unwrap_or_default();
            let matchup = flag(rest, "--match").unwrap_or_default();
            let event = state.add_event(date, matchup, now_millis())?;
            println!("added {} {} {}", event.id, event.date, event.matchup);
        }
        "delete-event" => {
            let id = positional(rest).context("delete-event needs an id")?;
            let event = state.delete_event(id)?;
            println!("deleted {} {}", event.id, event.matchup);
        }
        "set-featured" | "set-latest" => {
            let url = rest.first().map(String::as_str).unwrap_or("");
            let embed = if command == "set-featured" {
                state.set_featured_video(url)?
            } else {
                state.set_latest_episode(url)?
            };
            match (url.trim().is_empty(), embed) {
                (true, _) => println!("cleared"),
                (false, Some(video)) => println!("saved ({} embed {})", video.provider.label(), video.locator),
                (false, None) => println!("saved, but Cannot parse the provided URL"),
            }
        }
        "clear-cart" => {
            state.clear_cart();
            println!("cart cleared");
        }
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    }

    persist::save_from_state(&state, &mut store).context("save snapshot")?;
    match store.path() {
        Some(path) => info!("saved {}", path.display()),
        None => return Err(anyhow!("no data directory resolved; nothing was saved")),
    }
    Ok(())
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
        {
            return Some(next.as_str());
        }
    }
    None
}

fn positional(args: &[String]) -> Option<&str> {
    args.iter()
        .map(String::as_str)
        .find(|a| !a.starts_with("--") && !a.trim().is_empty())
}

fn print_state(state: &AppState) {
    println!("News ({}):", state.news.len());
    for n in &state.news {
        println!("  {}  {}  {}  [{}]", n.id, n.date, n.title, n.tags.join(", "));
    }
    println!("Events ({}):", state.events.len());
    for e in &state.events {
        println!("  {}  {}  {}", e.id, e.date, e.matchup);
    }
    println!(
        "Featured video: {}",
        state.featured_video.as_deref().unwrap_or("-")
    );
    println!(
        "Latest episode: {}",
        state.latest_episode.as_deref().unwrap_or("-")
    );
    println!("Cart lines: {}", state.cart.items().len());
    println!(
        "Headlines cached: {} (updated {})",
        state.headlines.len(),
        state
            .headlines_updated_label()
            .unwrap_or_else(|| "never".to_string())
    );
}
