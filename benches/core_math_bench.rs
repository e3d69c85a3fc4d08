use criterion::{Criterion, criterion_group, criterion_main};
use matrix_viz::core::{
    CanvasSize, DataPoint, PixelScale, ScreenPoint, ViewportBounds, ViewportState,
};
use matrix_viz::worker::PointIndex;
use std::hint::black_box;

fn grid_points(side: usize) -> Vec<DataPoint> {
    (0..side * side)
        .map(|i| DataPoint::new((i % side) as f64, (i / side) as f64))
        .collect()
}

fn bench_transform_round_trip(c: &mut Criterion) {
    let bounds = ViewportBounds::new(0.0, 10_000.0, -500.0, 500.0).expect("valid bounds");
    let transform = ViewportState::new(bounds).transform(CanvasSize::new(1920, 1080));

    c.bench_function("transform_round_trip", |b| {
        b.iter(|| {
            let screen = transform.to_screen(black_box(DataPoint::new(4_321.123, 17.5)));
            black_box(transform.to_data(screen));
        })
    });
    c.bench_function("transform_from_screen", |b| {
        b.iter(|| black_box(transform.to_data(black_box(ScreenPoint::new(960.0, 540.0)))))
    });
}

fn bench_zoom_pan_sequence(c: &mut Criterion) {
    let bounds = ViewportBounds::new(0.0, 1_000.0, 0.0, 1_000.0).expect("valid bounds");

    c.bench_function("zoom_pan_sequence_100", |b| {
        b.iter(|| {
            let mut viewport = ViewportState::new(bounds);
            for step in 0..100 {
                let delta = if step % 3 == 0 { 80.0 } else { -120.0 };
                black_box(viewport.zoom(delta, DataPoint::new(400.0, 600.0)));
                black_box(viewport.pan(3.0, -2.0));
            }
            viewport
        })
    });
}

fn bench_point_index_queries_10k(c: &mut Criterion) {
    let index = PointIndex::build(grid_points(100));
    let lasso = [10.0, 10.0, 80.0, 15.0, 60.0, 90.0, 20.0, 70.0];
    let scale = PixelScale::new(19.2, 10.8);

    c.bench_function("point_index_closest_10k", |b| {
        b.iter(|| black_box(index.closest(black_box(DataPoint::new(42.3, 57.8)), scale, 5.0)))
    });
    c.bench_function("point_index_build_grid_10k", |b| {
        b.iter(|| black_box(PointIndex::build(black_box(grid_points(100)))))
    });
    c.bench_function("point_index_select_box_10k", |b| {
        b.iter(|| black_box(index.select_box(black_box([20.0, 20.0, 60.0, 45.0]))))
    });
    c.bench_function("point_index_select_lasso_10k", |b| {
        b.iter(|| black_box(index.select_lasso(black_box(&lasso))))
    });
}

criterion_group!(
    benches,
    bench_transform_round_trip,
    bench_zoom_pan_sequence,
    bench_point_index_queries_10k
);
criterion_main!(benches);
