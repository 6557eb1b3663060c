use approx::assert_abs_diff_eq;
use timeline_rs::TimelineError;
use timeline_rs::core::{
    LinearTimeMapper, MagnificationSegment, SegmentedTimeMapper, TimeMapping, TimePoint, Viewport,
    ZoomLimits, to_pixel, to_time,
};

fn viewport(width: f64, pixels_per_ms: f64) -> Viewport {
    Viewport::new(TimePoint::from_millis(0), width, pixels_per_ms).expect("valid viewport")
}

#[test]
fn free_functions_are_inverse() {
    let px = to_pixel(1_500.0, 1_000.0, 0.5);
    assert_abs_diff_eq!(px, 250.0);
    assert_abs_diff_eq!(to_time(px, 1_000.0, 0.5), 1_500.0);
}

#[test]
fn viewport_visible_range_is_centered() {
    let viewport = viewport(1_000.0, 2.0);
    let (start, end) = viewport.visible_range();
    assert_abs_diff_eq!(start, -250.0);
    assert_abs_diff_eq!(end, 250.0);
    assert_abs_diff_eq!(viewport.visible_span_ms(), 500.0);

    let mapper = viewport.mapper();
    assert_abs_diff_eq!(mapper.ms_to_pixel(0.0), 500.0);
    assert_abs_diff_eq!(mapper.ms_to_pixel(-250.0), 0.0);
}

#[test]
fn viewport_rejects_degenerate_geometry() {
    let err = Viewport::new(TimePoint::from_millis(0), 0.0, 1.0).expect_err("zero width");
    assert!(matches!(err, TimelineError::InvalidViewport { .. }));

    let err = Viewport::new(TimePoint::from_millis(0), 800.0, f64::NAN).expect_err("nan scale");
    assert!(matches!(err, TimelineError::InvalidViewport { .. }));

    let mut viewport = viewport(800.0, 1.0);
    let err = viewport.resize(-1.0).expect_err("negative width");
    assert!(matches!(err, TimelineError::InvalidViewport { .. }));
    assert_abs_diff_eq!(viewport.pixel_width(), 800.0);
}

#[test]
fn pixel_pan_moves_against_content_direction() {
    let mut viewport = viewport(1_000.0, 0.5);
    let delta_ms = viewport.pan_by_pixels(100.0);
    assert_abs_diff_eq!(delta_ms, -200.0);
    assert_abs_diff_eq!(viewport.center_ms(), -200.0);

    assert_abs_diff_eq!(viewport.pan_by_pixels(f64::INFINITY), 0.0);
    assert_abs_diff_eq!(viewport.center_ms(), -200.0);
}

#[test]
fn zoom_saturates_at_limits() {
    let mut viewport = viewport(1_000.0, 1.0)
        .with_zoom_limits(ZoomLimits::new(0.5, 4.0).expect("limits"))
        .expect("apply limits");

    assert!(viewport.zoom_by(10.0));
    assert_abs_diff_eq!(viewport.zoom_level(), 4.0);
    assert!(!viewport.zoom_by(2.0));
    assert_abs_diff_eq!(viewport.pixels_per_ms(), 4.0);

    assert!(viewport.set_zoom_level(0.01));
    assert_abs_diff_eq!(viewport.zoom_level(), 0.5);
    assert!(!viewport.zoom_by(f64::NAN));
}

#[test]
fn zoom_keeps_center_time() {
    let mut viewport =
        Viewport::new(TimePoint::from_millis(12_345), 640.0, 0.25).expect("viewport");
    viewport.zoom_by(3.0);
    assert_abs_diff_eq!(viewport.center_ms(), 12_345.0);
}

#[test]
fn zoom_around_anchor_keeps_anchor_time() {
    let mut viewport = viewport(1_000.0, 1.0);
    let anchor_px = 800.0;
    let before = viewport.mapper().pixel_to_ms(anchor_px);
    assert!(viewport.zoom_by_around(2.0, anchor_px));
    let after = viewport.mapper().pixel_to_ms(anchor_px);
    assert_abs_diff_eq!(before, after, epsilon = 1e-9);
}

#[test]
fn zoom_limits_must_be_ordered() {
    let err = ZoomLimits::new(2.0, 1.0).expect_err("inverted");
    assert!(matches!(err, TimelineError::InvalidData(_)));
}

#[test]
fn linear_mapper_rejects_non_positive_scale() {
    let err = LinearTimeMapper::new(0.0, 0.0).expect_err("zero scale");
    assert!(matches!(err, TimelineError::InvalidData(_)));
}

#[test]
fn segmented_mapper_matches_linear_without_segments() {
    let viewport = viewport(1_200.0, 0.75);
    let linear = viewport.mapper();
    let segmented = SegmentedTimeMapper::for_viewport(&viewport, 1.0, Vec::new()).expect("mapper");
    for time in [-900.0, -10.0, 0.0, 333.0, 800.0] {
        assert_abs_diff_eq!(
            segmented.ms_to_pixel(time),
            linear.ms_to_pixel(time),
            epsilon = 1e-9
        );
    }
}

#[test]
fn segmented_mapper_widens_magnified_span() {
    let viewport = viewport(1_000.0, 1.0);
    let segments = vec![
        MagnificationSegment {
            start_ms: -100.0,
            end_ms: 100.0,
            magnify: 1.0,
        },
        MagnificationSegment {
            start_ms: 100.0,
            end_ms: 200.0,
            magnify: 3.0,
        },
    ];
    let mapper = SegmentedTimeMapper::for_viewport(&viewport, 1.0, segments).expect("mapper");

    assert_abs_diff_eq!(mapper.ms_to_pixel(0.0), 500.0, epsilon = 1e-9);
    let magnified = mapper.ms_to_pixel(200.0) - mapper.ms_to_pixel(100.0);
    assert_abs_diff_eq!(magnified, 300.0, epsilon = 1e-9);
    let after = mapper.ms_to_pixel(300.0) - mapper.ms_to_pixel(200.0);
    assert_abs_diff_eq!(after, 100.0, epsilon = 1e-9);

    let time = mapper.pixel_to_ms(mapper.ms_to_pixel(150.0));
    assert_abs_diff_eq!(time, 150.0, epsilon = 1e-9);
}

#[test]
fn pixel_to_time_saturates_to_time_point() {
    let mapper = LinearTimeMapper::new(0.0, 1.0).expect("mapper");
    assert_eq!(mapper.pixel_to_time(42.4), TimePoint::from_millis(42));
    assert_eq!(mapper.pixel_to_time(f64::MAX), TimePoint::MAX);
}
