//! HTML fragments for each page section, plus the full page shell.
//!
//! Every function is a pure string builder over state; element ids match the
//! page's fixed DOM surface.

use chrono::NaiveDate;

use crate::cart::{Cart, format_price};
use crate::embed;
use crate::headlines::Headline;
use crate::state::{AppState, Event, FighterStat, NewsItem, Product, QuickStats};

pub const ID_CART_COUNT: &str = "cartCount";
pub const ID_CART_ITEMS: &str = "cartItems";
pub const ID_CART_TOTAL: &str = "cartTotal";
pub const ID_NEWS: &str = "newsContainer";
pub const ID_EVENTS: &str = "eventsTableBody";
pub const ID_HEADLINES: &str = "breakingNewsList";
pub const ID_FEATURED_VIDEO: &str = "featuredVideo";
pub const ID_LATEST_EPISODE: &str = "latestEpisode";
pub const ID_PRODUCTS: &str = "productGrid";
pub const ID_FIGHTERS: &str = "fighterStats";
pub const ID_QUICK_STATS: &str = "quickStats";
pub const ID_LAST_UPDATED: &str = "lastUpdated";

pub const NO_HEADLINES: &str = "No headlines available";
pub const UNPARSEABLE_URL: &str = "Cannot parse the provided URL";
pub const NO_VIDEO: &str = "No video has been set yet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartFragments {
    pub count: String,
    pub items: String,
    pub total: String,
}

pub fn render_cart(cart: &Cart) -> CartFragments {
    let items = if cart.is_empty() {
        r#"<p class="cart-empty">Your cart is empty</p>"#.to_string()
    } else {
        let mut html = String::new();
        for item in cart.items() {
            let size = item
                .size
                .as_deref()
                .map(|s| format!(r#" <span class="cart-size">({})</span>"#, html_escape(s)))
                .unwrap_or_default();
            html.push_str(&format!(
                r#"<div class="cart-item" data-id="{id}" data-size="{size_attr}">
    <span class="cart-name">{name}</span>{size}
    <span class="cart-qty"><button class="qty-btn" data-delta="-1">-</button> {qty} <button class="qty-btn" data-delta="1">+</button></span>
    <span class="cart-line">{line}</span>
</div>"#,
                id = html_escape(&item.id),
                size_attr = html_escape(item.size.as_deref().unwrap_or("")),
                name = html_escape(&item.name),
                size = size,
                qty = item.quantity,
                line = format_price(item.line_total_cents()),
            ));
        }
        html
    };
    CartFragments {
        count: cart.count().to_string(),
        items,
        total: format_price(cart.total_cents()),
    }
}

pub fn render_products(products: &[Product]) -> String {
    let mut html = String::new();
    for p in products {
        let media = match p.image.as_deref() {
            Some(src) => format!(
                r#"<img src="{}" alt="{}">"#,
                html_escape(src),
                html_escape(&p.name)
            ),
            None => format!(r#"<span class="product-icon">{}</span>"#, html_escape(&p.icon)),
        };
        let sizes = if p.sizes.is_empty() {
            String::new()
        } else {
            let options: String = p
                .sizes
                .iter()
                .map(|s| format!(r#"<option value="{0}">{0}</option>"#, html_escape(s)))
                .collect();
            format!(r#"<select class="size-select"><option value="">Size</option>{options}</select>"#)
        };
        html.push_str(&format!(
            r#"<div class="product-card" data-id="{id}" data-category="{category}">
    {media}
    <h3>{name}</h3>
    <p>{description}</p>
    <div class="product-price">{price}</div>
    {sizes}
    <button class="add-to-cart">Add to Cart</button>
</div>"#,
            id = html_escape(&p.id),
            category = p.category.label(),
            media = media,
            name = html_escape(&p.name),
            description = html_escape(&p.description),
            price = format_price(u64::from(p.price_cents)),
            sizes = sizes,
        ));
    }
    html
}

pub fn render_news(news: &[NewsItem], admin: bool) -> String {
    if news.is_empty() {
        return r#"<p class="empty">No news yet.</p>"#.to_string();
    }
    let mut html = String::new();
    for item in news {
        let thumb = item
            .thumb
            .as_deref()
            .map(|src| {
                format!(
                    r#"<div class="news-thumb"><img src="{}" alt="{}"></div>"#,
                    html_escape(src),
                    html_escape(&item.title)
                )
            })
            .unwrap_or_default();
        let tags: String = item
            .tags
            .iter()
            .map(|t| format!(r#"<span class="tag">{}</span>"#, html_escape(t)))
            .collect();
        let delete = if admin {
            format!(
                r#"<button class="delete-news" data-id="{}">Delete</button>"#,
                html_escape(&item.id)
            )
        } else {
            String::new()
        };
        html.push_str(&format!(
            r#"<article class="news-card" data-id="{id}">
    {thumb}
    <div class="news-body">
        <h3>{title}</h3>
        <time>{date}</time>
        <p>{summary}</p>
        <div class="tags">{tags}</div>
        {delete}
    </div>
</article>"#,
            id = html_escape(&item.id),
            thumb = thumb,
            title = html_escape(&item.title),
            date = html_escape(&item.date),
            summary = html_escape(&item.summary),
            tags = tags,
            delete = delete,
        ));
    }
    html
}

pub fn render_events(events: &[Event], admin: bool) -> String {
    if events.is_empty() {
        return r#"<tr><td colspan="3">No upcoming events</td></tr>"#.to_string();
    }
    let mut html = String::new();
    for e in events {
        let action = if admin {
            format!(
                r#"<button class="delete-event" data-id="{}">Delete</button>"#,
                html_escape(&e.id)
            )
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<tr data-id=\"{}\"><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape(&e.id),
            html_escape(&e.date),
            html_escape(&e.matchup),
            action
        ));
    }
    html
}

pub fn render_headlines(headlines: &[Headline]) -> String {
    if headlines.is_empty() {
        return format!(r#"<li class="headline-empty">{NO_HEADLINES}</li>"#);
    }
    let mut html = String::new();
    for h in headlines {
        let text = if h.url.is_empty() {
            html_escape(&h.text)
        } else {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                html_escape(&h.url),
                html_escape(&h.text)
            )
        };
        html.push_str(&format!(
            r#"<li class="headline"><span class="headline-source">{}</span> {}</li>"#,
            html_escape(&h.source),
            text
        ));
    }
    html
}

/// Iframe for a recognised video URL, an inline placeholder otherwise.
pub fn render_video(url: Option<&str>, title: &str) -> String {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return format!(r#"<div class="video-placeholder">{NO_VIDEO}</div>"#);
    };
    match embed::resolve(url) {
        Some(video) => format!(
            r#"<div class="video-embed" data-provider="{provider}"><iframe src="{src}" title="{title}" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; picture-in-picture" allowfullscreen></iframe></div>"#,
            provider = video.provider.label(),
            src = html_escape(&video.locator),
            title = html_escape(title),
        ),
        None => format!(r#"<div class="video-placeholder">{UNPARSEABLE_URL}</div>"#),
    }
}

pub fn render_fighter_stats(fighters: &[FighterStat]) -> String {
    let mut html = String::new();
    for f in fighters {
        let nickname = if f.nickname.is_empty() {
            String::new()
        } else {
            format!(r#"<span class="nickname">"{}"</span>"#, html_escape(&f.nickname))
        };
        html.push_str(&format!(
            r#"<div class="fighter-card">
    <h3>{name} {nickname}</h3>
    <div class="fighter-meta">{division} | {country}</div>
    <div class="fighter-record">{record}</div>
    <div class="fighter-finishes">KO/TKO {ko} | SUB {sub}</div>
</div>"#,
            name = html_escape(&f.name),
            nickname = nickname,
            division = html_escape(&f.division),
            country = html_escape(&f.country),
            record = f.record,
            ko = f.ko_wins,
            sub = f.sub_wins,
        ));
    }
    html
}

pub fn render_quick_stats(stats: &QuickStats) -> String {
    let cells = [
        ("News", stats.news.to_string()),
        ("Upcoming Events", stats.upcoming_events.to_string()),
        ("Fighters", stats.fighters.to_string()),
        ("Combined Wins", stats.fighter_wins.to_string()),
        ("In Cart", stats.cart_count.to_string()),
    ];
    cells
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="stat"><span class="stat-value">{value}</span><span class="stat-label">{label}</span></div>"#
            )
        })
        .collect()
}

pub fn render_page(state: &AppState, today: NaiveDate) -> String {
    let cart = render_cart(&state.cart);
    let stats = state.quick_stats(today);
    let updated = state
        .headlines_updated_label()
        .unwrap_or_else(|| "never".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Dos Fronteras</title>
</head>
<body>
<header>
    <h1>Dos Fronteras</h1>
    <div class="cart-badge">Cart <span id="{id_cart_count}">{cart_count}</span></div>
</header>
<section class="breaking-news">
    <h2>Breaking News</h2>
    <ul id="{id_headlines}">{headlines}</ul>
    <small>Last updated: <span id="{id_updated}">{updated}</span></small>
</section>
<section id="{id_quick}" class="quick-stats">{quick}</section>
<section class="videos">
    <div id="{id_featured}">{featured}</div>
    <div id="{id_latest}">{latest}</div>
</section>
<section class="news">
    <h2>Latest News</h2>
    <div id="{id_news}">{news}</div>
</section>
<section class="events">
    <h2>Upcoming Events</h2>
    <table><thead><tr><th>Date</th><th>Match</th><th></th></tr></thead>
    <tbody id="{id_events}">{events}</tbody></table>
</section>
<section class="fighters">
    <h2>Fighter Stats</h2>
    <div id="{id_fighters}">{fighters}</div>
</section>
<section class="shop">
    <h2>Shop</h2>
    <div id="{id_products}">{products}</div>
    <aside class="cart">
        <div id="{id_cart_items}">{cart_items}</div>
        <div class="cart-total">Total: <span id="{id_cart_total}">{cart_total}</span></div>
    </aside>
</section>
</body>
</html>
"#,
        id_cart_count = ID_CART_COUNT,
        cart_count = cart.count,
        id_headlines = ID_HEADLINES,
        headlines = render_headlines(&state.headlines),
        id_updated = ID_LAST_UPDATED,
        updated = html_escape(&updated),
        id_quick = ID_QUICK_STATS,
        quick = render_quick_stats(&stats),
        id_featured = ID_FEATURED_VIDEO,
        featured = render_video(state.featured_video.as_deref(), "Featured video"),
        id_latest = ID_LATEST_EPISODE,
        latest = render_video(state.latest_episode.as_deref(), "Latest episode"),
        id_news = ID_NEWS,
        news = render_news(&state.news, state.admin),
        id_events = ID_EVENTS,
        events = render_events(&state.events, state.admin),
        id_fighters = ID_FIGHTERS,
        fighters = render_fighter_stats(&state.fighters),
        id_products = ID_PRODUCTS,
        products = render_products(&state.products),
        id_cart_items = ID_CART_ITEMS,
        cart_items = cart.items,
        id_cart_total = ID_CART_TOTAL,
        cart_total = cart.total,
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
