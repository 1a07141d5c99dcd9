//! Video URL to embed locator resolution.
//!
//! Rules are checked in table order and the first rule that yields an
//! embed wins. Patterns are anchored on the URL's host. Nothing here
//! touches the network; an extracted id is trusted as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoProvider {
    YouTube,
    Rumble,
    Instagram,
    TikTok,
}

impl VideoProvider {
    pub fn label(self) -> &'static str {
        match self {
            VideoProvider::YouTube => "YouTube",
            VideoProvider::Rumble => "Rumble",
            VideoProvider::Instagram => "Instagram",
            VideoProvider::TikTok => "TikTok",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEmbed {
    pub provider: VideoProvider,
    pub id: String,
    pub locator: String,
}

pub struct EmbedRule {
    pub name: &'static str,
    pub provider: VideoProvider,
    pattern: Regex,
    extract: fn(&Regex, &str) -> Option<String>,
    locator: fn(&str) -> String,
}

impl EmbedRule {
    fn new(
        name: &'static str,
        provider: VideoProvider,
        pattern: &str,
        extract: fn(&Regex, &str) -> Option<String>,
        locator: fn(&str) -> String,
    ) -> Self {
        Self {
            name,
            provider,
            // Patterns are compile-time literals covered by the rule tests.
            pattern: Regex::new(pattern).unwrap_or_else(|err| panic!("bad embed rule {name}: {err}")),
            extract,
            locator,
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    /// Applies this rule alone, ignoring the rest of the table.
    pub fn apply(&self, url: &str) -> Option<VideoEmbed> {
        if !self.pattern.is_match(url) {
            return None;
        }
        let id = (self.extract)(&self.pattern, url)?;
        if id.is_empty() {
            return None;
        }
        Some(VideoEmbed {
            provider: self.provider,
            locator: (self.locator)(&id),
            id,
        })
    }
}

static RULES: Lazy<Vec<EmbedRule>> = Lazy::new(|| {
    vec![
        EmbedRule::new(
            "youtube-watch",
            VideoProvider::YouTube,
            r"(?i)^https?://(?:[\w-]+\.)*youtube\.com/watch\?(?:[^#]*&)?v=([A-Za-z0-9_-]{11})",
            first_capture,
            youtube_locator,
        ),
        EmbedRule::new(
            "youtube-short",
            VideoProvider::YouTube,
            r"(?i)^https?://(?:[\w-]+\.)*youtu\.be/([A-Za-z0-9_-]{11})",
            first_capture,
            youtube_locator,
        ),
        EmbedRule::new(
            "youtube-path",
            VideoProvider::YouTube,
            r"(?i)^https?://(?:[\w-]+\.)*youtube\.com/(?:embed|shorts)/([A-Za-z0-9_-]{11})",
            first_capture,
            youtube_locator,
        ),
        EmbedRule::new(
            "rumble",
            VideoProvider::Rumble,
            r"(?i)^https?://(?:[\w-]+\.)*rumble\.com/",
            rumble_trailing_segment,
            |id| format!("https://rumble.com/embed/{id}/"),
        ),
        EmbedRule::new(
            "instagram",
            VideoProvider::Instagram,
            r"(?i)^https?://(?:[\w-]+\.)*instagram\.com/(?:p|reel|tv)/([A-Za-z0-9_-]+)",
            first_capture,
            |id| format!("https://www.instagram.com/p/{id}/embed"),
        ),
        EmbedRule::new(
            "tiktok",
            VideoProvider::TikTok,
            r"(?i)^https?://(?:[\w-]+\.)*tiktok\.com/@[^/]+/video/(\d+)",
            first_capture,
            |id| format!("https://www.tiktok.com/embed/v2/{id}"),
        ),
    ]
});

pub fn rules() -> &'static [EmbedRule] {
    &RULES
}

pub fn resolve(url: &str) -> Option<VideoEmbed> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    RULES
        .iter()
        .find_map(|rule| rule.apply(url))
}

fn first_capture(re: &Regex, url: &str) -> Option<String> {
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// Last non-empty path segment, cut at the first '.'. Query and fragment
// are dropped first.
fn rumble_trailing_segment(_re: &Regex, url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment.to_ascii_lowercase().contains("rumble.com") {
        return None;
    }
    let id = segment.split('.').next().unwrap_or_default().trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn youtube_locator(id: &str) -> String {
    format!("https://www.youtube.com/embed/{id}")
}
