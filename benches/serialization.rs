use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_ini::{from_str, to_string, Value};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone)]
struct Settings {
    #[serde(rename = "Video")]
    video: Video,
    #[serde(rename = "Audio")]
    audio: Audio,
}

#[derive(Serialize, Deserialize, Clone)]
struct Video {
    width: u32,
    height: u32,
    #[serde(rename = "fullscreen,omitempty,commented")]
    fullscreen: bool,
    #[serde(rename = ",inline")]
    quality: Quality,
}

#[derive(Serialize, Deserialize, Clone)]
struct Quality {
    gamma: f64,
    antialiasing: u8,
}

#[derive(Serialize, Deserialize, Clone)]
struct Audio {
    volume: f32,
    device: String,
    channels: Vec<String>,
}

fn settings() -> Settings {
    Settings {
        video: Video {
            width: 2560,
            height: 1440,
            fullscreen: true,
            quality: Quality {
                gamma: 2.2,
                antialiasing: 4,
            },
        },
        audio: Audio {
            volume: 0.8,
            device: "Speakers (High Definition Audio)".to_string(),
            channels: vec!["left".to_string(), "right".to_string(), "center".to_string()],
        },
    }
}

fn benchmark_serialize_settings(c: &mut Criterion) {
    let settings = settings();

    c.bench_function("serialize_settings", |b| {
        b.iter(|| to_string(black_box(&settings)))
    });
}

fn benchmark_deserialize_settings(c: &mut Criterion) {
    let text = to_string(&settings()).unwrap_or_default();

    c.bench_function("deserialize_settings", |b| {
        b.iter(|| from_str::<Settings>(black_box(&text)))
    });
}

fn map_document(sections: usize) -> BTreeMap<String, BTreeMap<String, Value>> {
    (0..sections)
        .map(|i| {
            let fields = (0..10)
                .map(|j| {
                    let value = match j % 3 {
                        0 => Value::from(i * j),
                        1 => Value::from(format!("value {} of {}", j, i)),
                        _ => Value::from(vec![i as f64 / 3.0, j as f64]),
                    };
                    (format!("key_{}", j), value)
                })
                .collect();
            (format!("section_{}", i), fields)
        })
        .collect()
}

fn benchmark_document_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_sizes");

    for size in [10, 100, 1000].iter() {
        let doc = map_document(*size);
        let text = to_string(&doc).unwrap_or_default();

        group.bench_with_input(BenchmarkId::new("serialize", size), &doc, |b, doc| {
            b.iter(|| to_string(black_box(doc)))
        });

        group.bench_with_input(BenchmarkId::new("deserialize", size), &text, |b, text| {
            b.iter(|| from_str::<BTreeMap<String, BTreeMap<String, Value>>>(black_box(text)))
        });
    }

    group.finish();
}

fn benchmark_quoted_strings(c: &mut Criterion) {
    let doc = BTreeMap::from([(
        "text",
        BTreeMap::from([
            ("ascii", "plain ascii text with spaces".repeat(8)),
            ("escaped", "quote ' and backslash \\ and tab\t".repeat(8)),
            ("unicode", "héllo wörld 🎉 ".repeat(8)),
        ]),
    )]);
    let text = to_string(&doc).unwrap_or_default();

    c.bench_function("serialize_quoted_strings", |b| {
        b.iter(|| to_string(black_box(&doc)))
    });

    c.bench_function("deserialize_quoted_strings", |b| {
        b.iter(|| from_str::<BTreeMap<String, BTreeMap<String, String>>>(black_box(&text)))
    });
}

criterion_group!(
    benches,
    benchmark_serialize_settings,
    benchmark_deserialize_settings,
    benchmark_document_sizes,
    benchmark_quoted_strings
);
criterion_main!(benches);
