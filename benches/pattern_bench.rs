//! Benchmarks for search pattern compilation and matching.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_dleapp::seeker::{compile_pattern, normalize_member_path};

const PATTERNS: &[&str] = &[
    "logs/*.csv",
    "**/FlightRecord/DJIFlightRecord_*.txt",
    "**/FLY[0-9][0-9][0-9].DAT",
    "**/Litchi/**/*.csv",
    "**/FreeFlight*/**/*.json",
];

/// Synthetic member list resembling a controller extraction.
fn member_paths(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 5 {
            0 => format!("./DJI/FlightRecord/DJIFlightRecord_{:04}.txt", i),
            1 => format!("sdcard/MISC/LOG/FLY{:03}.DAT", i % 1000),
            2 => format!("Android/data/com.aryuthere.visionplus/Litchi/{}/mission.csv", i),
            3 => format!("DCIM/100MEDIA/DJI_{:04}.JPG", i),
            _ => format!("\\logs\\session_{}.csv", i),
        })
        .collect()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_pattern");
    for pattern in PATTERNS {
        group.bench_with_input(BenchmarkId::from_parameter(pattern), pattern, |b, p| {
            b.iter(|| compile_pattern(black_box(p)).unwrap());
        });
    }
    group.finish();
}

fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_match");

    for count in [1_000, 10_000, 100_000] {
        let members: Vec<String> = member_paths(count)
            .iter()
            .map(|m| normalize_member_path(m))
            .collect();
        let regex = compile_pattern("**/FlightRecord/DJIFlightRecord_*.txt").unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("is_match", count), &members, |b, members| {
            b.iter(|| members.iter().filter(|m| regex.is_match(black_box(m))).count());
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let members = member_paths(10_000);
    c.bench_function("normalize_member_path_10k", |b| {
        b.iter(|| {
            for member in &members {
                black_box(normalize_member_path(member));
            }
        });
    });
}

criterion_group!(benches, bench_compile, bench_match, bench_normalize);
criterion_main!(benches);
