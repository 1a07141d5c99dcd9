use dosfronteras::embed::{VideoProvider, resolve, rules};

fn rule(name: &str) -> &'static dosfronteras::embed::EmbedRule {
    rules()
        .iter()
        .find(|r| r.name == name)
        .expect("rule should exist")
}

#[test]
fn youtube_short_link_ignores_query() {
    let video = resolve("https://youtu.be/dQw4w9WgXcQ?t=5").expect("should resolve");
    assert_eq!(video.provider, VideoProvider::YouTube);
    assert_eq!(video.id, "dQw4w9WgXcQ");
    assert_eq!(video.locator, "https://www.youtube.com/embed/dQw4w9WgXcQ");
}

#[test]
fn youtube_watch_link_with_extra_params() {
    let video = resolve("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42")
        .expect("should resolve");
    assert_eq!(video.id, "dQw4w9WgXcQ");

    let plain = rule("youtube-watch")
        .apply("https://youtube.com/watch?v=abcDEF12345")
        .expect("watch rule applies");
    assert_eq!(plain.locator, "https://www.youtube.com/embed/abcDEF12345");
}

#[test]
fn youtube_shorts_path() {
    let video = resolve("https://www.youtube.com/shorts/abcDEF12345").expect("should resolve");
    assert_eq!(video.provider, VideoProvider::YouTube);
    assert_eq!(video.id, "abcDEF12345");
}

#[test]
fn rumble_uses_trailing_segment_up_to_dot() {
    let video = resolve("https://rumble.com/v4abc12-pantoja-post-fight.html").expect("should resolve");
    assert_eq!(video.provider, VideoProvider::Rumble);
    assert_eq!(video.id, "v4abc12-pantoja-post-fight");
    assert_eq!(
        video.locator,
        "https://rumble.com/embed/v4abc12-pantoja-post-fight/"
    );

    let trailing_slash = rule("rumble")
        .apply("https://rumble.com/c/dosfronteras/")
        .expect("rumble rule applies");
    assert_eq!(trailing_slash.id, "dosfronteras");
}

#[test]
fn instagram_post_and_reel() {
    let post = resolve("https://www.instagram.com/p/C1a2B3c4D5e/").expect("should resolve");
    assert_eq!(post.provider, VideoProvider::Instagram);
    assert_eq!(post.id, "C1a2B3c4D5e");
    assert_eq!(post.locator, "https://www.instagram.com/p/C1a2B3c4D5e/embed");

    let reel = resolve("https://instagram.com/reel/Xy_9-z").expect("should resolve");
    assert_eq!(reel.id, "Xy_9-z");
}

#[test]
fn tiktok_video() {
    let video = resolve("https://www.tiktok.com/@dosfronteras/video/7301234567890123456?lang=en")
        .expect("should resolve");
    assert_eq!(video.provider, VideoProvider::TikTok);
    assert_eq!(video.id, "7301234567890123456");
    assert_eq!(
        video.locator,
        "https://www.tiktok.com/embed/v2/7301234567890123456"
    );
}

#[test]
fn unsupported_urls_are_unrecognized() {
    for url in [
        "https://example.com/video",
        "",
        "   ",
        "not a url at all",
        "https://youtu.be/short",
        "https://www.tiktok.com/@someone",
        "https://vimeo.com/123456",
    ] {
        assert!(resolve(url).is_none(), "{url:?} should not resolve");
    }
}

#[test]
fn rules_only_apply_to_their_own_provider() {
    let youtube = "https://youtu.be/dQw4w9WgXcQ";
    assert!(rule("youtube-short").matches(youtube));
    assert!(!rule("rumble").matches(youtube));
    assert!(!rule("instagram").matches(youtube));
    assert!(!rule("tiktok").matches(youtube));
    assert!(rule("tiktok").apply(youtube).is_none());
}

#[test]
fn provider_host_inside_another_url_is_unrecognized() {
    for url in [
        "https://example.com/share?u=rumble.com/v4abc12-x.html",
        "https://example.com/redirect/youtu.be/dQw4w9WgXcQ",
        "https://notrumble.com/v4abc12-x.html",
    ] {
        assert!(resolve(url).is_none(), "{url:?} should not resolve");
    }
}

#[test]
fn later_rule_still_gets_a_chance() {
    let video = resolve("https://www.instagram.com/p/C1a2B3c4D5e/?utm_source=rumble.com/")
        .expect("should resolve");
    assert_eq!(video.provider, VideoProvider::Instagram);
    assert_eq!(video.id, "C1a2B3c4D5e");
}

#[test]
fn rumble_ignores_query_and_fragment() {
    let video = resolve("https://rumble.com/embed/v4abc12/?pub=4").expect("should resolve");
    assert_eq!(video.id, "v4abc12");
    assert_eq!(video.locator, "https://rumble.com/embed/v4abc12/");

    let tagged = resolve("https://rumble.com/v4abc12-card.html#comments").expect("should resolve");
    assert_eq!(tagged.id, "v4abc12-card");
}
