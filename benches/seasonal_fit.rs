use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use will_it_rain::{SeasonalConfig, SeasonalModel, Variable};

fn fifteen_years() -> Vec<(NaiveDate, Option<f64>)> {
    let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    (0..5479u64)
        .map(|d| {
            let phase = 2.0 * std::f64::consts::PI * d as f64 / 365.25;
            let value = 21.0 + 4.5 * phase.sin() + 0.0002 * d as f64;
            // Roughly one day in fifty is missing.
            (start + Days::new(d), (d % 50 != 7).then_some(value))
        })
        .collect()
}

fn bench_seasonal(c: &mut Criterion) {
    let series = fifteen_years();
    let config = SeasonalConfig::default();
    c.bench_function("fit_15_years", |b| {
        b.iter(|| SeasonalModel::fit(Variable::Temperature, black_box(&series), &config))
    });

    let model = SeasonalModel::fit(Variable::Temperature, &series, &config).unwrap();
    let target = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
    c.bench_function("predict_one_day", |b| b.iter(|| model.predict(black_box(target))));
}

criterion_group!(benches, bench_seasonal);
criterion_main!(benches);
