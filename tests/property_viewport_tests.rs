use matrix_viz::core::{
    AxisRange, CanvasSize, DataPoint, ViewportBounds, ViewportState, to_data, to_screen,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn transform_round_trip_property(
        x_start in -1_000_000.0f64..1_000_000.0,
        x_span in 0.001f64..1_000_000.0,
        y_start in -1_000_000.0f64..1_000_000.0,
        y_span in 0.001f64..1_000_000.0,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
        width in 1u32..4096,
        height in 1u32..4096
    ) {
        let x_range = AxisRange::new(x_start, x_start + x_span);
        let y_range = AxisRange::new(y_start, y_start + y_span);
        let size = CanvasSize::new(width, height);
        let point = DataPoint::new(x_start + fx * x_span, y_start + fy * y_span);

        let screen = to_screen(point, x_range, y_range, size);
        let recovered = to_data(screen, x_range, y_range, size);

        let tolerance_x = 1e-9 * x_range.width().max(x_start.abs()).max(1.0);
        let tolerance_y = 1e-9 * y_range.width().max(y_start.abs()).max(1.0);
        prop_assert!((recovered.x - point.x).abs() <= tolerance_x);
        prop_assert!((recovered.y - point.y).abs() <= tolerance_y);
    }

    #[test]
    fn unit_range_round_trip_is_exact_within_1e9(
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0
    ) {
        let range = AxisRange::new(0.0, 10.0);
        let size = CanvasSize::new(500, 500);
        let point = DataPoint::new(fx * 10.0, fy * 10.0);

        let recovered = to_data(to_screen(point, range, range, size), range, range, size);
        prop_assert!((recovered.x - point.x).abs() <= 1e-9);
        prop_assert!((recovered.y - point.y).abs() <= 1e-9);
    }

    #[test]
    fn zoom_sequences_keep_ranges_ordered_and_inside_bounds(
        steps in prop::collection::vec((-900.0f64..900.0, 0.0f64..1.0, 0.0f64..1.0), 1..64)
    ) {
        let bounds = ViewportBounds::new(-50.0, 50.0, 0.0, 10.0).expect("bounds");
        let mut viewport = ViewportState::new(bounds);

        for (delta, fx, fy) in steps {
            let x = viewport.current_x_range();
            let y = viewport.current_y_range();
            let pointer = DataPoint::new(x.start + fx * x.width(), y.start + fy * y.width());
            let _ = viewport.zoom(delta, pointer);

            let x = viewport.current_x_range();
            let y = viewport.current_y_range();
            prop_assert!(x.start < x.end);
            prop_assert!(y.start < y.end);
            prop_assert!(x.start >= bounds.min_x && x.end <= bounds.max_x);
            prop_assert!(y.start >= bounds.min_y && y.end <= bounds.max_y);
        }
    }

    #[test]
    fn pan_sequences_keep_ranges_ordered(
        moves in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..64)
    ) {
        let bounds = ViewportBounds::new(0.0, 100.0, 0.0, 100.0).expect("bounds");
        let mut viewport = ViewportState::new(bounds);
        let width_before = viewport.current_x_range().width();

        for (dx, dy) in moves {
            let _ = viewport.pan(dx, dy);
            prop_assert!(viewport.current_x_range().start <= viewport.current_x_range().end);
            prop_assert!(viewport.current_y_range().start <= viewport.current_y_range().end);
        }
        prop_assert!((viewport.current_x_range().width() - width_before).abs() <= 1e-6);
    }
}
