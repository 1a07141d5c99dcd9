use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use dosfronteras::feed_parse::{parse_rss, parse_rss2json};
use dosfronteras::headlines::FeedError;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_rss_fixture() {
    let raw = read_fixture("rss_feed.xml");
    let items = parse_rss(&raw).expect("fixture should parse");
    // The untitled item is dropped.
    assert_eq!(items.len(), 3);

    assert_eq!(
        items[0].title,
        "Makhachev vs. Della Maddalena set for UFC 322 in New York"
    );
    assert_eq!(
        items[0].link,
        "https://mmajunkie.usatoday.com/story/ufc-322-makhachev"
    );
    assert_eq!(
        items[0].pub_date,
        Utc.with_ymd_and_hms(2025, 10, 28, 14, 3, 0).single()
    );
    assert_eq!(
        items[0].thumbnail.as_deref(),
        Some("https://cdn.example.com/makhachev.jpg")
    );
    assert!(items[0].description.starts_with("The former lightweight champion"));
    assert!(!items[0].description.contains('<'));

    assert_eq!(items[1].title, "Pereira & Ankalaev rematch – what we know");
    assert_eq!(items[1].description, "Details on the light heavyweight rematch.");
    assert_eq!(
        items[1].thumbnail.as_deref(),
        Some("https://cdn.example.com/pereira.png")
    );

    assert_eq!(items[2].title, "Undated notebook entry");
    assert!(items[2].pub_date.is_none());
    assert!(items[2].thumbnail.is_none());
}

#[test]
fn parses_atom_fixture() {
    let raw = read_fixture("atom_feed.xml");
    let items = parse_rss(&raw).expect("fixture should parse");
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].title, "Grasso returns against top contender");
    assert_eq!(
        items[0].link,
        "https://www.mmafighting.com/2025/10/28/grasso-returns"
    );
    assert_eq!(
        items[0].pub_date,
        Utc.with_ymd_and_hms(2025, 10, 28, 14, 0, 0).single()
    );
    assert_eq!(items[0].description, "Former flyweight champion is back.");

    assert_eq!(items[1].link, "https://www.mmafighting.com/2025/10/27/moreno-next");
    assert_eq!(items[1].description, "Short summary.");
}

#[test]
fn non_feed_documents_are_malformed() {
    assert!(matches!(
        parse_rss("<html><body>Not a feed</body></html>"),
        Err(FeedError::Malformed(_))
    ));
    assert!(matches!(parse_rss("   "), Err(FeedError::Malformed(_))));
}

#[test]
fn parses_rss2json_fixture() {
    let raw = read_fixture("rss2json_ok.json");
    let items = parse_rss2json(&raw).expect("fixture should parse");
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].title, "Rodriguez eyes featherweight title shot");
    assert_eq!(
        items[0].pub_date,
        Utc.with_ymd_and_hms(2025, 10, 28, 16, 45, 0).single()
    );
    assert_eq!(
        items[0].thumbnail.as_deref(),
        Some("https://cdn.example.com/rodriguez.jpg")
    );
    assert_eq!(
        items[0].description,
        "El Pantera wants the winner of the upcoming title fight."
    );

    // Empty thumbnail falls back to the first inline image.
    assert_eq!(
        items[1].thumbnail.as_deref(),
        Some("https://cdn.example.com/pantoja.jpg")
    );
}

#[test]
fn rss2json_error_status_is_malformed() {
    let raw = read_fixture("rss2json_error.json");
    match parse_rss2json(&raw) {
        Err(FeedError::Malformed(msg)) => assert!(msg.contains("Cannot download")),
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn rss2json_garbage_is_a_parse_error() {
    assert!(matches!(
        parse_rss2json("{not json"),
        Err(FeedError::Parse(_))
    ));
}

#[test]
fn rss2json_null_is_empty() {
    assert!(
        parse_rss2json("null")
            .expect("null should parse")
            .is_empty()
    );
}
