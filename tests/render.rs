use chrono::NaiveDate;
use dosfronteras::render::{
    NO_HEADLINES, NO_VIDEO, UNPARSEABLE_URL, html_escape, render_cart, render_events,
    render_headlines, render_news, render_page, render_quick_stats, render_video,
};
use dosfronteras::state::AppState;

#[test]
fn empty_headlines_show_placeholder() {
    assert!(render_headlines(&[]).contains(NO_HEADLINES));
}

#[test]
fn video_slot_states() {
    assert!(render_video(None, "Featured").contains(NO_VIDEO));
    assert!(render_video(Some("https://example.com/clip"), "Featured").contains(UNPARSEABLE_URL));

    let html = render_video(Some("https://www.tiktok.com/@df/video/7212345678901234567"), "Clip");
    assert!(html.contains(r#"<iframe src="https://www.tiktok.com/embed/v2/7212345678901234567""#));
    assert!(html.contains(r#"data-provider="TikTok""#));
}

#[test]
fn cart_fragments_follow_the_cart() {
    let mut state = AppState::new();
    let empty = render_cart(&state.cart);
    assert_eq!(empty.count, "0");
    assert_eq!(empty.total, "$0.00");
    assert!(empty.items.contains("Your cart is empty"));

    state.add_to_cart("cap-snapback", None).expect("add");
    state.add_to_cart("tee-classic", Some("XL")).expect("add");
    let full = render_cart(&state.cart);
    assert_eq!(full.count, "2");
    assert_eq!(full.total, "$54.98");
    assert!(full.items.contains(r#"data-size="XL""#));
}

#[test]
fn delete_buttons_only_in_admin_mode() {
    let mut state = AppState::new();
    state.news = dosfronteras::catalog::sample_news();
    assert!(!render_news(&state.news, false).contains("delete-news"));
    assert!(render_news(&state.news, true).contains("delete-news"));
    assert!(render_events(&state.events, true).contains("delete-event"));
    assert!(render_events(&[], false).contains("No upcoming events"));
    assert!(render_news(&[], false).contains("No news yet."));
}

#[test]
fn user_text_is_escaped() {
    assert_eq!(html_escape(r#"<b>"A&B"</b>"#), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");

    let mut state = AppState::new();
    state.admin = true;
    state
        .add_event("2025-12-20", "<script>alert(1)</script>", 1)
        .expect("event");
    let html = render_events(&state.events, false);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn full_page_carries_every_section_id() {
    let state = AppState::new();
    let page = render_page(&state, NaiveDate::from_ymd_opt(2025, 11, 1).expect("date"));
    for id in [
        "cartCount",
        "cartItems",
        "cartTotal",
        "newsContainer",
        "eventsTableBody",
        "breakingNewsList",
        "featuredVideo",
        "latestEpisode",
        "productGrid",
        "fighterStats",
        "quickStats",
        "lastUpdated",
    ] {
        assert!(page.contains(&format!(r#"id="{id}""#)), "missing {id}");
    }
    assert!(page.contains(NO_HEADLINES));
    assert!(page.contains(">never<"));
}

#[test]
fn quick_stats_include_the_cart() {
    let mut state = AppState::new();
    state.add_to_cart("bottle-steel", None).expect("add");
    state.add_to_cart("bottle-steel", None).expect("add");
    let html = render_quick_stats(&state.quick_stats(NaiveDate::from_ymd_opt(2025, 11, 1).expect("date")));
    assert!(html.contains(
        r#"<span class="stat-value">2</span><span class="stat-label">In Cart</span>"#
    ));
}
