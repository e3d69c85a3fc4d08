use approx::assert_relative_eq;
use matrix_viz::core::{
    AxisRange, CanvasSize, PanBoundsPolicy, PanOutcome, ViewportBounds, ViewportState, ZoomOutcome,
};
use matrix_viz::interaction::{InteractionController, InteractionEffect, PointerInput, ViewportChange};

fn square_viewport(max: f64) -> ViewportState {
    ViewportState::new(ViewportBounds::new(0.0, max, 0.0, max).expect("bounds"))
}

#[test]
fn wheel_zoom_in_at_canvas_center_narrows_both_axes_inside_bounds() {
    let mut viewport = square_viewport(10.0);
    let mut controller = InteractionController::new();

    let effects = controller.wheel(
        PointerInput::at(250.0, 250.0),
        -100.0,
        &mut viewport,
        CanvasSize::new(500, 500),
    );

    assert_eq!(
        effects.as_slice(),
        &[InteractionEffect::ViewportChanged(ViewportChange::ZoomIn)]
    );
    let x = viewport.current_x_range();
    assert!(x.start > 0.0);
    assert!(x.width() < 10.0);
    assert!(x.end <= 10.0);
    assert_relative_eq!(x.start, 0.5, epsilon = 1e-12);
    assert_relative_eq!(x.end, 9.5, epsilon = 1e-12);
    assert_relative_eq!(viewport.current_y_range().start, 0.5, epsilon = 1e-12);
}

#[test]
fn zoom_out_at_full_extent_is_rejected() {
    let mut viewport = square_viewport(10.0);
    let before = viewport.snapshot();

    let outcome = viewport.zoom(200.0, matrix_viz::core::DataPoint::new(5.0, 5.0));

    assert_eq!(outcome, ZoomOutcome::Rejected);
    assert_eq!(viewport.snapshot(), before);
}

#[test]
fn zoom_out_after_zoom_in_reports_zoom_out_and_stays_clamped() {
    let mut viewport = square_viewport(10.0);
    let center = matrix_viz::core::DataPoint::new(5.0, 5.0);
    assert_eq!(viewport.zoom(-500.0, center), ZoomOutcome::ZoomIn);
    assert_eq!(viewport.zoom(900.0, center), ZoomOutcome::ZoomOut);

    let x = viewport.current_x_range();
    assert!(x.start >= 0.0 && x.end <= 10.0);
}

#[test]
fn locked_axis_is_untouched_by_zoom_and_pan() {
    let mut viewport = square_viewport(10.0);
    viewport.set_locked_x(true);

    viewport.zoom(-100.0, matrix_viz::core::DataPoint::new(5.0, 5.0));
    viewport.pan(100.0, 100.0);

    assert_eq!(viewport.current_x_range(), AxisRange::new(0.0, 10.0));
    assert_ne!(viewport.current_y_range(), AxisRange::new(0.0, 10.0));
}

#[test]
fn pan_displacement_scales_with_range_width() {
    let mut narrow = square_viewport(100.0);
    let mut wide = square_viewport(200.0);

    narrow.pan(10.0, 0.0);
    wide.pan(10.0, 0.0);

    let narrow_shift = narrow.current_x_range().start;
    let wide_shift = wide.current_x_range().start;
    assert_relative_eq!(narrow_shift, -1.0, epsilon = 1e-12);
    assert_relative_eq!(wide_shift, 2.0 * narrow_shift, epsilon = 1e-12);
}

#[test]
fn pan_moves_x_against_pointer_and_y_with_it() {
    let mut viewport = square_viewport(100.0);

    assert_eq!(viewport.pan(10.0, 10.0), PanOutcome::Moved);

    assert!(viewport.current_x_range().start < 0.0);
    assert!(viewport.current_y_range().start > 0.0);
}

#[test]
fn unbounded_pan_may_leave_outer_bounds() {
    let mut viewport = square_viewport(100.0);
    for _ in 0..50 {
        viewport.pan(-100.0, 0.0);
    }
    assert!(viewport.current_x_range().end > 100.0);
}

#[test]
fn shift_into_bounds_policy_keeps_window_inside_and_width_intact() {
    let mut viewport = square_viewport(100.0)
        .with_tuning(1000.0, 1000.0, PanBoundsPolicy::ShiftIntoBounds)
        .expect("tuning");
    viewport.zoom(-500.0, matrix_viz::core::DataPoint::new(50.0, 50.0));
    let width = viewport.current_x_range().width();

    for _ in 0..50 {
        viewport.pan(-400.0, 0.0);
    }

    let x = viewport.current_x_range();
    assert_relative_eq!(x.end, 100.0, epsilon = 1e-9);
    assert_relative_eq!(x.width(), width, epsilon = 1e-9);
}

#[test]
fn tuning_rejects_non_positive_sensitivity() {
    assert!(
        square_viewport(1.0)
            .with_tuning(0.0, 1000.0, PanBoundsPolicy::Unbounded)
            .is_err()
    );
}
