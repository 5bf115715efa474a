use criterion::{Criterion, black_box, criterion_group, criterion_main};
use receipt_points::{Receipt, score_receipt, validate_receipt};

const TARGET: &str = include_str!("../fixtures/receipts/target.json");
const CORNER_MARKET: &str = include_str!("../fixtures/receipts/corner-market.json");

fn bench_scoring(c: &mut Criterion) {
    let target: Receipt = serde_json::from_str(TARGET).expect("fixture parses");
    let corner: Receipt = serde_json::from_str(CORNER_MARKET).expect("fixture parses");

    let mut group = c.benchmark_group("scoring");
    group.bench_function("score_target_receipt", |b| {
        b.iter(|| score_receipt(black_box(&target)))
    });
    group.bench_function("score_corner_market_receipt", |b| {
        b.iter(|| score_receipt(black_box(&corner)))
    });
    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let target: Receipt = serde_json::from_str(TARGET).expect("fixture parses");

    let mut group = c.benchmark_group("validation");
    group.bench_function("validate_target_receipt", |b| {
        b.iter(|| validate_receipt(black_box(&target)))
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.bench_function("decode_target_receipt", |b| {
        b.iter(|| serde_json::from_str::<Receipt>(black_box(TARGET)))
    });
    group.finish();
}

criterion_group!(benches, bench_scoring, bench_validation, bench_decode);
criterion_main!(benches);
