use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use polars::prelude::*;
use powerload::pipeline::ForecastingPipeline;
use powerload::timeseries::WindowStrategy;
use powerload::training::{GradientBoostingConfig, GradientBoostingRegressor};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

fn create_daily_data(n_days: usize) -> (DataFrame, Array1<f64>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);

    let df = df!(
        "year" => (0..n_days).map(|i| (2000 + i / 365) as f64).collect::<Vec<_>>(),
        "month" => (0..n_days).map(|i| MONTHS[(i % 365) / 31 % 12]).collect::<Vec<_>>(),
        "weekday" => (0..n_days).map(|i| WEEKDAYS[i % 7]).collect::<Vec<_>>(),
        "holiday" => (0..n_days).map(|i| if i % 365 < 2 { 1.0 } else { 0.0 }).collect::<Vec<_>>()
    )
    .unwrap();

    let target = (0..n_days)
        .map(|i| 800.0 + 60.0 * (i % 7) as f64 + rng.gen::<f64>() * 25.0)
        .collect();

    (df, target)
}

fn model() -> GradientBoostingRegressor {
    GradientBoostingRegressor::new(GradientBoostingConfig::default().with_n_estimators(50))
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for n_days in [1095, 3650].iter() {
        let (df, y) = create_daily_data(*n_days);

        group.bench_with_input(BenchmarkId::new("gradient_boosting", n_days), &(df, y), |b, (df, y)| {
            b.iter(|| {
                let mut pipeline =
                    ForecastingPipeline::with_regressor(df.clone(), y.clone(), model()).unwrap();
                pipeline.fit().unwrap();
                black_box(pipeline.is_fitted())
            })
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    group.sample_size(10);

    let (df, y) = create_daily_data(3650);
    let pipeline = ForecastingPipeline::with_regressor(df, y, model()).unwrap();

    for strategy in [WindowStrategy::Rolling, WindowStrategy::Expanding] {
        group.bench_function(BenchmarkId::new("walk_forward", strategy), |b| {
            b.iter(|| black_box(pipeline.validate(1825, 365, strategy).unwrap()))
        });
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let (df, y) = create_daily_data(3650);
    let mut pipeline = ForecastingPipeline::with_regressor(df, y, model()).unwrap();
    pipeline.fit().unwrap();

    let (new, _) = create_daily_data(365);
    c.bench_function("predict_one_year", |b| {
        b.iter(|| black_box(pipeline.predict(black_box(&new)).unwrap()))
    });
}

criterion_group!(benches, bench_fit, bench_validate, bench_predict);
criterion_main!(benches);
