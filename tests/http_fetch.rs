use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use dosfronteras::headlines::{FeedError, FeedFetcher, FeedMode, FeedSource, HttpFeedFetcher};
use dosfronteras::http_client::build_client;

enum Reply {
    Respond(String),
    Stall(Duration),
}

/// Serves a single connection on a loopback port and returns its base url.
fn serve_once(reply: Reply) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);
        match reply {
            Reply::Respond(raw) => {
                let _ = stream.write_all(raw.as_bytes());
                let _ = stream.flush();
            }
            Reply::Stall(wait) => thread::sleep(wait),
        }
    });
    format!("http://{addr}")
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn rss2json_fetcher(base: &str, timeout: Duration) -> HttpFeedFetcher {
    HttpFeedFetcher::new(FeedMode::Rss2Json, None)
        .with_endpoint(format!("{base}/v1/api.json"))
        .with_client(build_client(timeout).expect("client"))
}

fn source() -> FeedSource {
    FeedSource::new("MMA Fighting", "https://www.mmafighting.com/rss/current")
}

#[test]
fn error_status_maps_to_http() {
    let base = serve_once(Reply::Respond(http_response("503 Service Unavailable", "")));
    let fetcher = rss2json_fetcher(&base, Duration::from_secs(5));
    assert_eq!(fetcher.fetch(&source(), 5), Err(FeedError::Http(503)));
}

#[test]
fn ok_envelope_without_items_is_empty() {
    let base = serve_once(Reply::Respond(http_response(
        "200 OK",
        r#"{"status":"ok","items":[]}"#,
    )));
    let fetcher = rss2json_fetcher(&base, Duration::from_secs(5));
    assert_eq!(fetcher.fetch(&source(), 5), Err(FeedError::Empty));
}

#[test]
fn ok_envelope_items_are_returned_up_to_the_limit() {
    let body = r#"{"status":"ok","items":[
        {"title":"First","link":"https://a.example/1","pubDate":"2025-10-28 14:03:00","description":"One","thumbnail":""},
        {"title":"Second","link":"https://a.example/2","pubDate":"2025-10-27 10:00:00","description":"Two","thumbnail":""}
    ]}"#;
    let base = serve_once(Reply::Respond(http_response("200 OK", body)));
    let fetcher = rss2json_fetcher(&base, Duration::from_secs(5));

    let items = fetcher.fetch(&source(), 1).expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "First");
    assert_eq!(items[0].link, "https://a.example/1");
}

#[test]
fn stalled_server_maps_to_timeout() {
    let base = serve_once(Reply::Stall(Duration::from_secs(3)));
    let fetcher = rss2json_fetcher(&base, Duration::from_millis(300));
    assert_eq!(fetcher.fetch(&source(), 5), Err(FeedError::Timeout));
}

#[test]
fn direct_mode_parses_the_document() {
    let xml = include_str!("fixtures/rss_feed.xml");
    let base = serve_once(Reply::Respond(http_response("200 OK", xml)));
    let fetcher = HttpFeedFetcher::new(FeedMode::Direct, None)
        .with_client(build_client(Duration::from_secs(5)).expect("client"));

    let feed = FeedSource::new("Local", format!("{base}/feed.xml"));
    let items = fetcher.fetch(&feed, 10).expect("items");
    assert_eq!(items.len(), 3);
}
