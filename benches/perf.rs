use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use dosfronteras::embed;
use dosfronteras::feed_parse::{parse_rss, parse_rss2json};
use dosfronteras::headlines::{FeedSource, PipelineOptions, fallback_headlines, finalize};
use dosfronteras::render::render_page;
use dosfronteras::state::AppState;

const VIDEO_URLS: &[&str] = &[
    "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
    "https://youtu.be/dQw4w9WgXcQ?t=5",
    "https://rumble.com/v4abc12-fight-night-recap.html",
    "https://www.instagram.com/reel/C1a2B3c4D5e/",
    "https://www.tiktok.com/@dosfronteras/video/7212345678901234567",
    "https://vimeo.com/12345",
];

fn bench_embed_resolve(c: &mut Criterion) {
    c.bench_function("embed_resolve", |b| {
        b.iter(|| {
            for url in VIDEO_URLS {
                black_box(embed::resolve(black_box(url)));
            }
        })
    });
}

fn bench_rss_parse(c: &mut Criterion) {
    c.bench_function("rss_parse", |b| {
        b.iter(|| {
            let items = parse_rss(black_box(RSS_XML)).unwrap();
            black_box(items.len());
        })
    });
}

fn bench_atom_parse(c: &mut Criterion) {
    c.bench_function("atom_parse", |b| {
        b.iter(|| {
            let items = parse_rss(black_box(ATOM_XML)).unwrap();
            black_box(items.len());
        })
    });
}

fn bench_rss2json_parse(c: &mut Criterion) {
    c.bench_function("rss2json_parse", |b| {
        b.iter(|| {
            let items = parse_rss2json(black_box(RSS2JSON_OK)).unwrap();
            black_box(items.len());
        })
    });
}

fn bench_headline_finalize(c: &mut Criterion) {
    let sources: Vec<FeedSource> = (0..8)
        .map(|i| FeedSource::new(format!("Source {i}"), format!("https://feed{i}.example/rss")))
        .collect();
    let opts = PipelineOptions {
        per_source: 20,
        max_total: 100,
        ..PipelineOptions::default()
    };
    let combined: Vec<_> = (0..4)
        .flat_map(|_| fallback_headlines(&sources, &opts))
        .collect();

    c.bench_function("headline_finalize", |b| {
        b.iter(|| {
            let out = finalize(black_box(combined.clone()), 15);
            black_box(out.len());
        })
    });
}

fn bench_render_page(c: &mut Criterion) {
    let mut state = AppState::new();
    state.news = dosfronteras::catalog::sample_news();
    state.headlines = fallback_headlines(&[], &PipelineOptions::default());
    let _ = state.add_to_cart("tee-classic", Some("M"));
    let today = chrono::NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();

    c.bench_function("render_page", |b| {
        b.iter(|| {
            let html = render_page(black_box(&state), today);
            black_box(html.len());
        })
    });
}

criterion_group!(
    perf,
    bench_embed_resolve,
    bench_rss_parse,
    bench_atom_parse,
    bench_rss2json_parse,
    bench_headline_finalize,
    bench_render_page
);
criterion_main!(perf);

static RSS_XML: &str = include_str!("../tests/fixtures/rss_feed.xml");
static ATOM_XML: &str = include_str!("../tests/fixtures/atom_feed.xml");
static RSS2JSON_OK: &str = include_str!("../tests/fixtures/rss2json_ok.json");
