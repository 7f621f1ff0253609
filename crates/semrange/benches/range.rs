use criterion::{black_box, criterion_group, criterion_main, Criterion};
use semrange::{Range, Semrange, Version};

fn bench_version_parse(c: &mut Criterion) {
    let versions = [
        "1.2.3",
        "0.0.0",
        "10.20.30",
        "1.2.3-beta.1",
        "2.4.0+build.5",
        "1.2.3-rc.1+build.5",
        "18446744073709551615.0.0",
    ];

    c.bench_function("version_parse", |b| {
        b.iter(|| {
            for version in versions {
                black_box(Version::parse(black_box(version)).ok());
            }
        })
    });
}

fn bench_version_compare(c: &mut Criterion) {
    let cases = [
        ("1.2.3", "1.2.4"),
        ("2.4.0-alpha", "2.4.0"),
        ("1.0.0-alpha.1", "1.0.0-alpha.beta"),
        ("1.0.0-beta.2", "1.0.0-beta.11"),
        ("1.2.3+build.1", "1.2.3+build.2"),
    ];
    let parsed: Vec<(Version, Version)> = cases
        .iter()
        .map(|(a, b)| (Version::parse(a).unwrap(), Version::parse(b).unwrap()))
        .collect();

    c.bench_function("version_compare", |b| {
        b.iter(|| {
            for (a, bver) in &parsed {
                black_box(black_box(a).cmp_precedence(black_box(bver)));
            }
        })
    });
}

fn bench_parse_range(c: &mut Criterion) {
    let ranges = [
        ">=1.2.3 <2.0.0",
        "^1.2.3 || ~2.4",
        "1.2.x || 2.*",
        "1.2.3 - 2.0.0",
        "~1.2.1 >=1.2.3",
        ">1.0 <3.0 || >=4.0",
        "*",
    ];

    c.bench_function("parse_range", |b| {
        b.iter(|| {
            for range in ranges {
                black_box(Range::parse(black_box(range)).ok());
            }
        })
    });
}

fn bench_range_contains(c: &mut Criterion) {
    let range = Range::parse("^1.2.3 || >=2.0.0 <3.0.0").expect("parse range");
    let versions: Vec<Version> = [
        "1.2.3",
        "1.9.0",
        "1.2.2",
        "2.5.0",
        "3.0.0",
        "1.3.0-beta",
    ]
    .iter()
    .map(|v| Version::parse(v).unwrap())
    .collect();

    c.bench_function("range_contains", |b| {
        b.iter(|| {
            for version in &versions {
                black_box(black_box(&range).contains(black_box(version)));
            }
        })
    });
}

fn bench_satisfies(c: &mut Criterion) {
    let cases = [
        ("1.2.3", "^1.2.0"),
        ("1.2.3-beta", "^1.2.3"),
        ("2.4.5", "~2.4"),
        ("1.2.3", ">=1.2.3 <2.0.0"),
        ("1.9999.9999", "<2.0.0"),
        ("1.2.3", "1.2.* || 2.*"),
    ];

    c.bench_function("semrange_satisfies", |b| {
        b.iter(|| {
            for (version, range) in cases {
                black_box(Semrange::satisfies(black_box(version), black_box(range)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_version_parse,
    bench_version_compare,
    bench_parse_range,
    bench_range_contains,
    bench_satisfies
);
criterion_main!(benches);
