use log::warn;
use serde::de::DeserializeOwned;

use crate::cart::{Cart, CartItem};
use crate::headlines::Headline;
use crate::state::{AppState, Event, NewsItem};
use crate::storage::{
    KEY_CART, KEY_EVENTS, KEY_FEATURED_VIDEO, KEY_HEADLINES, KEY_HEADLINES_UPDATED,
    KEY_LATEST_EPISODE, KEY_NEWS, LocalStore, StorageError,
};

/// Copies every stored key into `state`. A key that fails to decode keeps
/// the state's current value.
pub fn load_into_state(state: &mut AppState, store: &LocalStore) {
    if let Some(news) = load_key::<Vec<NewsItem>>(store, KEY_NEWS) {
        state.news = news;
    }
    if let Some(mut events) = load_key::<Vec<Event>>(store, KEY_EVENTS) {
        events.sort_by(|a, b| a.date.cmp(&b.date));
        state.events = events;
    }
    if let Some(items) = load_key::<Vec<CartItem>>(store, KEY_CART) {
        state.cart = Cart::from_items(items);
    }
    state.featured_video = load_url(store, KEY_FEATURED_VIDEO);
    state.latest_episode = load_url(store, KEY_LATEST_EPISODE);

    match load_key::<Vec<Headline>>(store, KEY_HEADLINES) {
        Some(headlines) => {
            state.headlines = headlines;
            state.headlines_updated_at = store
                .get_item(KEY_HEADLINES_UPDATED)
                .and_then(|raw| raw.trim().parse::<i64>().ok());
        }
        // Without a readable cache the timestamp means nothing.
        None => {
            state.headlines.clear();
            state.headlines_updated_at = None;
        }
    }
    state.dirty = false;
}

/// Full snapshot write of every persisted key.
pub fn save_from_state(state: &AppState, store: &mut LocalStore) -> Result<(), StorageError> {
    let entries = vec![
        (KEY_NEWS, Some(encode(KEY_NEWS, &state.news)?)),
        (KEY_EVENTS, Some(encode(KEY_EVENTS, &state.events)?)),
        (KEY_CART, Some(encode(KEY_CART, &state.cart)?)),
        (KEY_FEATURED_VIDEO, state.featured_video.clone()),
        (KEY_LATEST_EPISODE, state.latest_episode.clone()),
        (KEY_HEADLINES, Some(encode(KEY_HEADLINES, &state.headlines)?)),
        (
            KEY_HEADLINES_UPDATED,
            state.headlines_updated_at.map(|ts| ts.to_string()),
        ),
    ];
    store.set_many(entries)
}

/// Saves when something changed. Storage failures are logged, not raised,
/// and leave the state dirty so the next call retries the write.
pub fn save_if_dirty(state: &mut AppState, store: &mut LocalStore) {
    if !state.dirty {
        return;
    }
    match save_from_state(state, store) {
        Ok(()) => state.dirty = false,
        Err(err) => {
            warn!("snapshot write failed: {err}");
            state.push_log(format!("[WARN] Save failed: {err}"));
        }
    }
}

fn load_key<T: DeserializeOwned>(store: &LocalStore, key: &str) -> Option<T> {
    match store.get_json::<T>(key) {
        Ok(value) => value,
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}

fn load_url(store: &LocalStore, key: &str) -> Option<String> {
    store
        .get_item(key)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
}

fn encode<T: serde::Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })
}
