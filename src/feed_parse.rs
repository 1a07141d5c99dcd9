use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::headlines::FeedError;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub description: String,
    pub thumbnail: Option<String>,
}

static RSS_ITEM: Lazy<Regex> = Lazy::new(|| block_re("item"));
static ATOM_ENTRY: Lazy<Regex> = Lazy::new(|| block_re("entry"));
static TITLE: Lazy<Regex> = Lazy::new(|| block_re("title"));
static LINK: Lazy<Regex> = Lazy::new(|| block_re("link"));
static PUB_DATE: Lazy<Regex> = Lazy::new(|| block_re("pubDate"));
static DC_DATE: Lazy<Regex> = Lazy::new(|| block_re("dc:date"));
static PUBLISHED: Lazy<Regex> = Lazy::new(|| block_re("published"));
static UPDATED: Lazy<Regex> = Lazy::new(|| block_re("updated"));
static DESCRIPTION: Lazy<Regex> = Lazy::new(|| block_re("description"));
static SUMMARY: Lazy<Regex> = Lazy::new(|| block_re("summary"));
static CONTENT: Lazy<Regex> = Lazy::new(|| block_re("content"));
static ATOM_LINK_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<link\b([^>]*?)/?>"#).unwrap_or_else(|err| panic!("atom link: {err}"))
});
static MEDIA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<(?:media:thumbnail|media:content|enclosure)\b[^>]*?\burl\s*=\s*["']([^"']+)["']"#)
        .unwrap_or_else(|err| panic!("media url: {err}"))
});
static IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#)
        .unwrap_or_else(|err| panic!("img src: {err}"))
});
static TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap_or_else(|err| panic!("tags: {err}")));
static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(x[0-9A-Fa-f]+|[0-9]+);").unwrap_or_else(|err| panic!("entity: {err}"))
});
static SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").unwrap_or_else(|err| panic!("spaces: {err}")));

fn block_re(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}\b[^>]*>(.*?)</{tag}>"))
        .unwrap_or_else(|err| panic!("tag {tag}: {err}"))
}

/// Parses an RSS 2.0 or Atom document into feed items, in document order.
pub fn parse_rss(raw: &str) -> Result<Vec<FeedItem>, FeedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FeedError::Malformed("empty document".to_string()));
    }
    let is_rss = trimmed.contains("<rss") || trimmed.contains("<channel");
    let is_atom = trimmed.contains("<feed");
    if !is_rss && !is_atom {
        return Err(FeedError::Malformed("not an rss or atom document".to_string()));
    }

    let blocks = if is_rss { &RSS_ITEM } else { &ATOM_ENTRY };
    let items = blocks
        .captures_iter(trimmed)
        .filter_map(|caps| caps.get(1))
        .filter_map(|block| parse_block(block.as_str(), is_rss))
        .collect();
    Ok(items)
}

fn parse_block(block: &str, is_rss: bool) -> Option<FeedItem> {
    let title = capture_text(&TITLE, block).map(|t| clean_text(&t))?;
    if title.is_empty() {
        return None;
    }

    let link = if is_rss {
        capture_text(&LINK, block)
            .map(|l| decode_entities(l.trim()))
            .unwrap_or_default()
    } else {
        atom_link(block).unwrap_or_default()
    };

    let pub_date = [&PUB_DATE, &DC_DATE, &PUBLISHED, &UPDATED]
        .into_iter()
        .find_map(|re| capture_text(re, block))
        .and_then(|raw| parse_feed_date(&raw));

    let raw_description = [&DESCRIPTION, &SUMMARY, &CONTENT]
        .into_iter()
        .find_map(|re| capture_text(re, block))
        .unwrap_or_default();
    let decoded_description = decode_entities(&raw_description);

    let thumbnail = MEDIA_URL
        .captures(block)
        .or_else(|| IMG_SRC.captures(&decoded_description))
        .and_then(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|url| !url.is_empty());

    Some(FeedItem {
        title,
        link,
        pub_date,
        description: strip_html(&decoded_description),
        thumbnail,
    })
}

// Prefers rel="alternate" (or no rel) over other link relations.
fn atom_link(block: &str) -> Option<String> {
    let mut fallback = None;
    for caps in ATOM_LINK_HREF.captures_iter(block) {
        let Some(attrs) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Some(href) = attr_value(attrs, "href") else {
            continue;
        };
        match attr_value(attrs, "rel").as_deref() {
            None | Some("alternate") => return Some(href),
            Some(_) => {
                fallback.get_or_insert(href);
            }
        }
    }
    fallback
}

fn attr_value(attrs: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=");
    let start = attrs.find(&needle)? + needle.len();
    let rest = &attrs[start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let body = &rest[1..];
    let end = body.find(quote)?;
    Some(decode_entities(&body[..end]))
}

fn capture_text(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| unwrap_cdata(m.as_str()).to_string())
}

fn unwrap_cdata(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .unwrap_or(trimmed)
}

fn clean_text(raw: &str) -> String {
    strip_html(&decode_entities(raw))
}

#[derive(Debug, Deserialize)]
struct Rss2JsonEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<Rss2JsonItem>,
}

#[derive(Debug, Deserialize)]
struct Rss2JsonItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnail: Option<String>,
}

/// Parses the feed-to-JSON envelope. Anything other than `status: "ok"`
/// is an error; a `null` body is an empty list.
pub fn parse_rss2json(raw: &str) -> Result<Vec<FeedItem>, FeedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let envelope: Rss2JsonEnvelope = serde_json::from_str(trimmed)
        .map_err(|err| FeedError::Parse(format!("invalid rss2json payload: {err}")))?;
    if envelope.status != "ok" {
        let message = envelope
            .message
            .unwrap_or_else(|| format!("status {:?}", envelope.status));
        return Err(FeedError::Malformed(message));
    }

    let items = envelope
        .items
        .into_iter()
        .filter_map(|item| {
            let title = clean_text(&item.title);
            if title.is_empty() {
                return None;
            }
            let description = decode_entities(&item.description);
            let thumbnail = item
                .thumbnail
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .or_else(|| {
                    IMG_SRC
                        .captures(&description)
                        .and_then(|caps| caps.get(1))
                        .map(|m| m.as_str().to_string())
                });
            Some(FeedItem {
                title,
                link: item.link.trim().to_string(),
                pub_date: item.pub_date.as_deref().and_then(parse_feed_date),
                description: strip_html(&description),
                thumbnail,
            })
        })
        .collect();
    Ok(items)
}

/// Accepts RFC 2822 (RSS), RFC 3339 (Atom) and the `YYYY-MM-DD HH:MM:SS`
/// form the conversion endpoint emits (taken as UTC).
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn strip_html(raw: &str) -> String {
    let without_tags = TAGS.replace_all(raw, " ");
    SPACES.replace_all(without_tags.trim(), " ").into_owned()
}

pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let numeric = NUMERIC_ENTITY.replace_all(raw, |caps: &regex::Captures| {
        let body = &caps[1];
        let code = match body.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => body.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(
            decode_entities("Jones &amp; Aspinall &#8211; &#x27;soon&#x27;"),
            "Jones & Aspinall – 'soon'"
        );
    }

    #[test]
    fn feed_dates_in_all_shapes() {
        let rfc2822 = parse_feed_date("Tue, 28 Oct 2025 14:03:00 +0000").expect("rfc2822");
        let rfc3339 = parse_feed_date("2025-10-28T14:03:00Z").expect("rfc3339");
        let plain = parse_feed_date("2025-10-28 14:03:00").expect("plain");
        assert_eq!(rfc2822, rfc3339);
        assert_eq!(rfc3339, plain);
        assert!(parse_feed_date("yesterday").is_none());
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        assert_eq!(strip_html("<p>Fight  <b>night</b></p>\n"), "Fight night");
    }
}
