//! Benchmarks for the indicator engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trading_core::traits::{BarIndicator, Indicator};
use trading_core::types::{Bar, BarSeries, Timeframe};
use trading_indicators::{Atr, Ema, IndicatorParams, IndicatorSnapshot, SessionVwap};

fn generate_bars(size: usize) -> Vec<Bar> {
    (0..size)
        .map(|i| {
            let base = 60_000.0 + (i as f64 * 0.1).sin() * 500.0;
            Bar::new(i as i64 * 300_000, base, base + 25.0, base - 25.0, base + 5.0, 3.0)
        })
        .collect()
}

fn benchmark_ema(c: &mut Criterion) {
    let mut group = c.benchmark_group("EMA");

    for size in [200, 1000, 10000].iter() {
        let closes: Vec<f64> = generate_bars(*size).iter().map(|b| b.close).collect();

        group.bench_with_input(BenchmarkId::new("ema21", size), &closes, |b, data| {
            let ema = Ema::new(21);
            b.iter(|| ema.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_bar_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("BarIndicators");

    for size in [200, 1000, 10000].iter() {
        let bars = generate_bars(*size);

        group.bench_with_input(BenchmarkId::new("atr14", size), &bars, |b, data| {
            let atr = Atr::new(14);
            b.iter(|| atr.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("session_vwap", size), &bars, |b, data| {
            let vwap = SessionVwap::new(chrono_tz::Europe::Moscow);
            b.iter(|| vwap.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_snapshot(c: &mut Criterion) {
    let series = BarSeries::from_bars("BTC/USD", Timeframe::minutes(5), generate_bars(200));
    let params = IndicatorParams {
        ema_fast: 9,
        ema_slow: 21,
        atr_period: 14,
        session_tz: chrono_tz::Europe::Moscow,
    };

    c.bench_function("snapshot_200_bars", |b| {
        b.iter(|| IndicatorSnapshot::compute(black_box(&series), black_box(&params)))
    });
}

criterion_group!(
    benches,
    benchmark_ema,
    benchmark_bar_indicators,
    benchmark_snapshot
);
criterion_main!(benches);
