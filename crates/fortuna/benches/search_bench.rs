use criterion::{black_box, criterion_group, criterion_main, Criterion};
use chrono::{NaiveDate, TimeZone, Utc};
use fortuna::search::linear_position;
use fortuna::{
    find_crossing_time, AspectCatalog, AspectLocator, Direction, DurationWindow, MotionModel, SearchConfig,
    SearchDirection, StackDetector, StackEntry, TwoPassParams,
};

fn bench_locate_aspects(c: &mut Criterion) {
    let config = SearchConfig::default();
    let locator = AspectLocator::new(&config);
    let catalog = AspectCatalog::default();
    let epoch = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let body = MotionModel::new("mars", 17.0, 0.62, Direction::Direct);

    c.bench_function("locate_aspects", |b| {
        b.iter(|| {
            locator.locate_aspects(
                black_box(&body),
                black_box(243.5),
                "natal_sun",
                &catalog,
                SearchDirection::Future,
                epoch,
            )
        })
    });
}

fn bench_find_crossing_time(c: &mut Criterion) {
    let epoch = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let asc = MotionModel::new("asc", 30.0, 360.0, Direction::Direct);
    let params = TwoPassParams::default();

    c.bench_function("find_crossing_time", |b| {
        b.iter(|| find_crossing_time(date, black_box(212.25), &params, linear_position(&asc, epoch)))
    });
}

fn bench_stack_internal(c: &mut Criterion) {
    let detector = StackDetector::new(&SearchConfig::default());
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let entries: Vec<StackEntry> = (0..200)
        .map(|i| {
            let t = start + chrono::Duration::minutes(i * 7);
            StackEntry::new(format!("body{}_event", i % 9), None)
                .with_window(DurationWindow::around(t, chrono::Duration::minutes(10)))
        })
        .collect();

    c.bench_function("stack_internal_200", |b| {
        b.iter(|| {
            let mut batch = entries.clone();
            detector.stack_internal(black_box(&mut batch), true);
            detector.group_stacks(&batch)
        })
    });
}

criterion_group!(benches, bench_locate_aspects, bench_find_crossing_time, bench_stack_internal);
criterion_main!(benches);
