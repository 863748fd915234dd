//! Bigram index benchmark over a synthetic address catalogue.
//! Measures merge + index build time and query throughput.
//!
//! Usage: cargo bench --bench bigram_search
//!
//! Set `ZIPSEARCH_BENCH_SOURCE` to a decompressed KEN_ALL.CSV (Shift_JIS) to
//! run against the real catalogue instead.

use std::time::Instant;
use zipsearch_core::bigram::build_index;
use zipsearch_core::config::SourceEncoding;
use zipsearch_core::merge::merge_rows;
use zipsearch_core::storage::read_source;
use zipsearch_core::{Catalogue, RawRow};

const PREFECTURES: [&str; 8] = [
    "北海道", "青森県", "東京都", "神奈川県", "京都府", "大阪府", "福岡県", "沖縄県",
];
const CITIES: [&str; 6] = ["中央区", "北区", "港区", "東山区", "那覇市", "札幌市"];
const TOWNS: [&str; 10] = [
    "本町", "新町", "旭ケ丘", "桜木町", "栄町", "緑町", "弓矢町", "大通西", "松原", "山手",
];

/// Deterministic pseudo-catalogue with one bracketed continuation every 50 rows.
fn synthetic_rows(count: usize) -> Vec<RawRow> {
    let mut rows = Vec::with_capacity(count);
    let mut i = 0usize;
    while rows.len() < count {
        let zip = format!("{:07}", 1_000_000 + i);
        let prefecture = PREFECTURES[i % PREFECTURES.len()];
        let city = CITIES[(i / 3) % CITIES.len()];
        let town = TOWNS[(i * 7) % TOWNS.len()];
        if i % 50 == 0 {
            rows.push(RawRow::new(&zip, prefecture, city, format!("{town}（{}丁目、", i % 9 + 1)));
            rows.push(RawRow::new(&zip, prefecture, city, "番地）"));
        } else {
            rows.push(RawRow::new(&zip, prefecture, city, format!("{town}{}丁目", i % 9 + 1)));
        }
        i += 1;
    }
    rows
}

fn main() {
    println!("=== Bigram Index Benchmark ===");
    println!();

    let rows = match std::env::var("ZIPSEARCH_BENCH_SOURCE") {
        Ok(path) => {
            print!("Loading {path}...");
            read_source(std::path::Path::new(&path), SourceEncoding::ShiftJis).unwrap()
        }
        Err(_) => {
            print!("Generating synthetic catalogue...");
            synthetic_rows(120_000)
        }
    };
    println!(" {} rows", rows.len());

    println!();
    println!("--- Index Construction ---");
    let t0 = Instant::now();
    let records = merge_rows(rows).unwrap();
    let merge_time = t0.elapsed();
    let t1 = Instant::now();
    let index = build_index(&records);
    let build_time = t1.elapsed();
    println!(
        "Merge time: {:.3}s ({} records)",
        merge_time.as_secs_f64(),
        records.len()
    );
    println!(
        "Build time: {:.3}s ({:.0} records/s)",
        build_time.as_secs_f64(),
        records.len() as f64 / build_time.as_secs_f64()
    );
    println!(
        "Bigrams: {} | Postings: {}",
        index.len(),
        index.posting_count()
    );

    let catalogue = Catalogue::new(index, records).unwrap();

    println!();
    println!("--- Queries ---");
    let keywords = ["東京", "港区", "京都東山", "札幌 大通", "旭ケ丘", "弓矢町（", "沖縄那覇本町"];

    for keyword in &keywords {
        let _ = catalogue.search(keyword);
    }

    for keyword in &keywords {
        let rounds = 5;
        let t0 = Instant::now();
        let mut hits = 0;
        for _ in 0..rounds {
            hits = catalogue.search(keyword).len();
        }
        let elapsed = t0.elapsed();
        let avg_ms = elapsed.as_secs_f64() * 1000.0 / rounds as f64;
        println!("  {keyword:<12} | hits: {hits:<7} | avg latency: {avg_ms:.2} ms");
    }

    println!();
    println!("=== Benchmark complete ===");
}
