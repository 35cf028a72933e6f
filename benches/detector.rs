//! Benchmarks for the regime detector.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hulltrend::prelude::*;

/// Generate realistic random bars
fn generate_bars(n: usize) -> Vec<Candle> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

    let o = price;
    let c = price + change;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    bars.push(Candle::new(o, h, l, c));
    price = c;
  }

  bars
}

fn bench_pipeline(c: &mut Criterion) {
  let bars = generate_bars(1000);
  let period = Period::new(200).unwrap();
  let factor = Factor::new(2.5).unwrap();

  c.bench_function("derive_series_1000_bars", |b| {
    b.iter(|| black_box(DerivedSeries::compute(black_box(&bars), period, factor)))
  });
}

fn bench_ingest(c: &mut Criterion) {
  let bars = generate_bars(1001);
  let (history, last) = bars.split_at(1000);

  c.bench_function("ingest_full_buffer_1000", |b| {
    b.iter_batched(
      || {
        let mut d = TrendDetector::new(DetectorConfig::default()).unwrap();
        d.seed(history).unwrap();
        d
      },
      |mut d| black_box(d.ingest(last[0]).unwrap()),
      criterion::BatchSize::LargeInput,
    )
  });
}

fn bench_scaling(c: &mut Criterion) {
  let mut group = c.benchmark_group("hull_average_scaling");
  let data: Vec<f64> = generate_bars(2000).iter().map(|b| b.high - b.low).collect();

  for period in [20usize, 50, 100, 200] {
    let hma = HullAverage::new(Period::new(period).unwrap());
    group.bench_with_input(BenchmarkId::from_parameter(period), &data, |b, data| {
      b.iter(|| black_box(hma.compute(black_box(data))))
    });
  }

  group.finish();
}

fn bench_seed(c: &mut Criterion) {
  let bars = generate_bars(5000);

  c.bench_function("seed_5000_bars", |b| {
    b.iter(|| {
      let mut d = TrendDetector::new(DetectorConfig::default()).unwrap();
      black_box(d.seed(black_box(&bars)).unwrap())
    })
  });
}

criterion_group!(benches, bench_pipeline, bench_ingest, bench_scaling, bench_seed);
criterion_main!(benches);
