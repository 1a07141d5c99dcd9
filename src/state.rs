use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{Cart, CartError, CartItem};
use crate::catalog;
use crate::embed::{self, VideoEmbed};
use crate::headlines::{Headline, HeadlineBatch};

const MAX_LOGS: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("admin mode is off")]
    Locked,
    #[error("unknown product {0}")]
    UnknownProduct(String),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    Apparel,
    Accessories,
    Gear,
}

impl ProductCategory {
    pub fn label(self) -> &'static str {
        match self {
            ProductCategory::Apparel => "Apparel",
            ProductCategory::Accessories => "Accessories",
            ProductCategory::Gear => "Gear",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price_cents: u32,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub category: ProductCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.draws)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterStat {
    pub name: String,
    pub nickname: String,
    pub division: String,
    pub record: Record,
    pub ko_wins: u32,
    pub sub_wins: u32,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub date: String,
    pub matchup: String,
}

/// Admin form input for a news card.
#[derive(Debug, Clone, Default)]
pub struct NewsDraft {
    pub title: String,
    pub summary: String,
    pub date: String,
    /// Comma separated.
    pub tags: String,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickStats {
    pub news: usize,
    pub upcoming_events: usize,
    pub fighters: usize,
    pub fighter_wins: u32,
    pub cart_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteKind {
    News,
    Event,
}

/// A delete that waits for the admin to confirm it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub kind: DeleteKind,
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Shop,
    Events,
    Fighters,
    Videos,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Shop,
        Screen::Events,
        Screen::Fighters,
        Screen::Videos,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Shop => "Shop",
            Screen::Events => "Events",
            Screen::Fighters => "Fighters",
            Screen::Videos => "Videos",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub selected: usize,
    pub size_choice: usize,
    pub products: Vec<Product>,
    pub fighters: Vec<FighterStat>,
    pub cart: Cart,
    pub news: Vec<NewsItem>,
    pub events: Vec<Event>,
    pub headlines: Vec<Headline>,
    /// Unix millis of the last headline refresh.
    pub headlines_updated_at: Option<i64>,
    pub headlines_failed: Vec<String>,
    pub headlines_loading: bool,
    pub featured_video: Option<String>,
    pub latest_episode: Option<String>,
    pub admin: bool,
    pub confirm: Option<PendingDelete>,
    pub notice: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    /// Set by every mutation, cleared once the snapshot is written.
    pub dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            selected: 0,
            size_choice: 0,
            products: catalog::products(),
            fighters: catalog::fighters(),
            cart: Cart::new(),
            news: Vec::new(),
            events: catalog::seed_events(),
            headlines: Vec::new(),
            headlines_updated_at: None,
            headlines_failed: Vec::new(),
            headlines_loading: false,
            featured_video: None,
            latest_episode: None,
            admin: false,
            confirm: None,
            notice: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            dirty: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn toggle_admin(&mut self) -> bool {
        self.admin = !self.admin;
        self.admin
    }

    fn require_admin(&self) -> Result<(), StateError> {
        if self.admin {
            Ok(())
        } else {
            Err(StateError::Locked)
        }
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        catalog::find_product(&self.products, id)
    }

    pub fn add_to_cart(&mut self, product_id: &str, size: Option<&str>) -> Result<CartItem, StateError> {
        let product = catalog::find_product(&self.products, product_id)
            .ok_or_else(|| StateError::UnknownProduct(product_id.to_string()))?;
        let line = self.cart.add(product, size)?.clone();
        self.dirty = true;
        Ok(line)
    }

    pub fn change_quantity(
        &mut self,
        product_id: &str,
        size: Option<&str>,
        delta: i64,
    ) -> Result<Option<u32>, StateError> {
        let qty = self.cart.change_quantity(product_id, size, delta)?;
        self.dirty = true;
        Ok(qty)
    }

    pub fn remove_from_cart(&mut self, product_id: &str, size: Option<&str>) -> Result<CartItem, StateError> {
        let line = self.cart.remove(product_id, size)?;
        self.dirty = true;
        Ok(line)
    }

    pub fn clear_cart(&mut self) {
        if !self.cart.is_empty() {
            self.cart.clear();
            self.dirty = true;
        }
    }

    pub fn add_news(&mut self, draft: NewsDraft, now_ms: i64) -> Result<&NewsItem, StateError> {
        self.require_admin()?;
        let title = required(&draft.title, "title")?;
        let summary = required(&draft.summary, "summary")?;
        let date = valid_date(&draft.date)?;
        let id = unique_id("news", now_ms, |id| self.news.iter().any(|n| n.id == id));
        let item = NewsItem {
            id,
            title,
            summary,
            date,
            tags: parse_tags(&draft.tags),
            thumb: draft
                .thumb
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        };
        self.news.insert(0, item);
        self.dirty = true;
        Ok(&self.news[0])
    }

    pub fn delete_news(&mut self, id: &str) -> Result<NewsItem, StateError> {
        self.require_admin()?;
        let idx = self
            .news
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| StateError::NotFound {
                kind: "news item",
                id: id.to_string(),
            })?;
        self.dirty = true;
        Ok(self.news.remove(idx))
    }

    pub fn add_event(&mut self, date: &str, matchup: &str, now_ms: i64) -> Result<&Event, StateError> {
        self.require_admin()?;
        let date = valid_date(date)?;
        let matchup = required(matchup, "match")?;
        let id = unique_id("event", now_ms, |id| self.events.iter().any(|e| e.id == id));
        self.events.push(Event {
            id: id.clone(),
            date,
            matchup,
        });
        // ISO dates sort lexically.
        self.events.sort_by(|a, b| a.date.cmp(&b.date));
        self.dirty = true;
        self.events
            .iter()
            .find(|e| e.id == id)
            .ok_or(StateError::NotFound {
                kind: "event",
                id,
            })
    }

    pub fn delete_event(&mut self, id: &str) -> Result<Event, StateError> {
        self.require_admin()?;
        let idx = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StateError::NotFound {
                kind: "event",
                id: id.to_string(),
            })?;
        self.dirty = true;
        Ok(self.events.remove(idx))
    }

    /// Queues the selected news item or event for deletion. Nothing is
    /// removed until `confirm_delete`.
    pub fn request_delete_selected(&mut self) -> Result<Option<&PendingDelete>, StateError> {
        self.require_admin()?;
        let pending = match self.screen {
            Screen::Home => self.news.get(self.selected).map(|n| PendingDelete {
                kind: DeleteKind::News,
                id: n.id.clone(),
                label: n.title.clone(),
            }),
            Screen::Events => self.events.get(self.selected).map(|e| PendingDelete {
                kind: DeleteKind::Event,
                id: e.id.clone(),
                label: e.matchup.clone(),
            }),
            _ => None,
        };
        self.confirm = pending;
        Ok(self.confirm.as_ref())
    }

    /// Runs the queued delete. Returns the removed item's label, or `None`
    /// when nothing was queued.
    pub fn confirm_delete(&mut self) -> Result<Option<String>, StateError> {
        let Some(pending) = self.confirm.take() else {
            return Ok(None);
        };
        let label = match pending.kind {
            DeleteKind::News => self.delete_news(&pending.id)?.title,
            DeleteKind::Event => self.delete_event(&pending.id)?.matchup,
        };
        self.selected = self.selected.saturating_sub(1);
        Ok(Some(label))
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.confirm.take().is_some()
    }

    /// Stores the URL even when no provider recognises it; the renderer shows
    /// a placeholder for those. A blank URL clears the slot.
    pub fn set_featured_video(&mut self, url: &str) -> Result<Option<VideoEmbed>, StateError> {
        self.require_admin()?;
        let (stored, embed) = video_slot(url);
        self.featured_video = stored;
        self.dirty = true;
        Ok(embed)
    }

    pub fn set_latest_episode(&mut self, url: &str) -> Result<Option<VideoEmbed>, StateError> {
        self.require_admin()?;
        let (stored, embed) = video_slot(url);
        self.latest_episode = stored;
        self.dirty = true;
        Ok(embed)
    }

    /// Replaces the headline list wholesale.
    pub fn set_headlines(&mut self, batch: HeadlineBatch) {
        self.headlines = batch.headlines;
        self.headlines_updated_at = Some(batch.fetched_at);
        self.headlines_failed = batch.failed_sources;
        self.headlines_loading = false;
        self.dirty = true;
    }

    pub fn upcoming_events(&self, today: NaiveDate) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| {
                NaiveDate::parse_from_str(&e.date, "%Y-%m-%d")
                    .map(|d| d >= today)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn quick_stats(&self, today: NaiveDate) -> QuickStats {
        QuickStats {
            news: self.news.len(),
            upcoming_events: self.upcoming_events(today).len(),
            fighters: self.fighters.len(),
            fighter_wins: self.fighters.iter().map(|f| f.record.wins).sum(),
            cart_count: self.cart.count(),
        }
    }

    pub fn headlines_updated_label(&self) -> Option<String> {
        let ts = self.headlines_updated_at?;
        DateTime::<Utc>::from_timestamp_millis(ts).map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
    }

    /// Sources whose last refresh fell back to mock headlines, for the
    /// ticker title.
    pub fn headlines_fallback_label(&self) -> Option<String> {
        if self.headlines_failed.is_empty() {
            return None;
        }
        Some(format!("fallback: {}", self.headlines_failed.join(", ")))
    }

    fn list_len(&self) -> usize {
        match self.screen {
            Screen::Home => self.news.len(),
            Screen::Shop => self.products.len(),
            Screen::Events => self.events.len(),
            Screen::Fighters => self.fighters.len(),
            Screen::Videos => 2,
        }
    }

    pub fn select_next(&mut self) {
        let total = self.list_len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
        self.size_choice = 0;
    }

    pub fn select_prev(&mut self) {
        let total = self.list_len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 {
            total - 1
        } else {
            self.selected - 1
        };
        self.size_choice = 0;
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.selected = 0;
            self.size_choice = 0;
        }
    }

    pub fn cycle_screen(&mut self) {
        let idx = Screen::ALL
            .iter()
            .position(|s| *s == self.screen)
            .unwrap_or(0);
        self.set_screen(Screen::ALL[(idx + 1) % Screen::ALL.len()]);
    }

    pub fn selected_product(&self) -> Option<&Product> {
        if self.screen != Screen::Shop {
            return None;
        }
        self.products.get(self.selected)
    }

    pub fn cycle_size(&mut self) {
        let Some(count) = self.selected_product().map(|p| p.sizes.len()) else {
            return;
        };
        if count > 0 {
            self.size_choice = (self.size_choice + 1) % count;
        }
    }

    pub fn selected_size(&self) -> Option<String> {
        let product = self.selected_product()?;
        product.sizes.get(self.size_choice).cloned()
    }
}

fn video_slot(url: &str) -> (Option<String>, Option<VideoEmbed>) {
    let url = url.trim();
    if url.is_empty() {
        return (None, None);
    }
    (Some(url.to_string()), embed::resolve(url))
}

fn required(raw: &str, field: &'static str) -> Result<String, StateError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(StateError::MissingField(field));
    }
    Ok(value.to_string())
}

fn valid_date(raw: &str) -> Result<String, StateError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| StateError::InvalidDate(raw.to_string()))
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// `<prefix>-<millis>`, bumped until `taken` reports it free.
fn unique_id(prefix: &str, now_ms: i64, taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = now_ms;
    loop {
        let id = format!("{prefix}-{stamp}");
        if !taken(&id) {
            return id;
        }
        stamp = stamp.saturating_add(1);
    }
}

/// Reads a local image into a `data:` URL. Remote URLs pass through.
pub fn thumb_data_url(path_or_url: &str) -> Result<String> {
    let raw = path_or_url.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("data:") {
        return Ok(raw.to_string());
    }
    let path = Path::new(raw);
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        other => return Err(anyhow!("unsupported thumbnail type {:?}", other.unwrap_or(""))),
    };
    let bytes = fs::read(path).with_context(|| format!("read thumbnail {}", path.display()))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[derive(Debug, Clone)]
pub enum Delta {
    HeadlinesLoading,
    SetHeadlines(HeadlineBatch),
    /// Feed-derived news; only lands when the news list is still empty.
    SeedNews(Vec<NewsItem>),
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    RefreshHeadlines,
    FetchNews,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::HeadlinesLoading => state.headlines_loading = true,
        Delta::SetHeadlines(batch) => {
            let failed = batch.failed_sources.len();
            let count = batch.headlines.len();
            state.set_headlines(batch);
            if failed > 0 {
                state.push_log(format!(
                    "[WARN] Headlines: {failed} source(s) fell back to mock data"
                ));
            }
            state.push_log(format!("[INFO] Headlines updated ({count})"));
        }
        Delta::SeedNews(items) => {
            if !state.news.is_empty() {
                return;
            }
            state.news = if items.is_empty() {
                catalog::sample_news()
            } else {
                items
            };
            state.dirty = true;
            state.push_log(format!("[INFO] News seeded ({})", state.news.len()));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
