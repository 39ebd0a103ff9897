use super::*;

const EPSILON: f64 = 1e-9;

fn assert_point_eq(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < EPSILON && (actual.y - expected.y).abs() < EPSILON,
        "expected {expected:?}, got {actual:?}"
    );
}

// =============================================================================
// Viewport::scale
// =============================================================================

#[test]
fn scale_uses_dpr_when_positive() {
    assert!((Viewport::new(10.0, 10.0, 2.5).scale() - 2.5).abs() < EPSILON);
}

#[test]
fn scale_falls_back_to_one_for_zero_nan_and_negative() {
    for dpr in [0.0, -2.0, f64::NAN, f64::INFINITY] {
        assert!((Viewport::new(10.0, 10.0, dpr).scale() - 1.0).abs() < EPSILON, "dpr {dpr}");
    }
}

// =============================================================================
// Viewport::backing_size
// =============================================================================

#[test]
fn backing_size_multiplies_css_size_by_dpr() {
    assert_eq!(Viewport::new(200.0, 100.0, 2.0).backing_size(), (400, 200));
}

#[test]
fn backing_size_rounds_fractional_pixels() {
    assert_eq!(Viewport::new(100.5, 33.3, 1.5).backing_size(), (151, 50));
}

#[test]
fn backing_size_of_empty_box_is_zero() {
    assert_eq!(Viewport::default().backing_size(), (0, 0));
    assert_eq!(Viewport::new(-5.0, 10.0, 1.0).backing_size(), (0, 10));
}

// =============================================================================
// Coordinate conversions
// =============================================================================

#[test]
fn client_to_local_subtracts_origin() {
    let vp = Viewport::new(200.0, 100.0, 1.0).with_origin(30.0, 40.0);
    assert_point_eq(vp.client_to_local(Point::new(40.0, 50.0)), Point::new(10.0, 10.0));
}

#[test]
fn normalize_divides_by_css_size() {
    let vp = Viewport::new(200.0, 100.0, 3.0);
    assert_point_eq(vp.normalize(Point::new(10.0, 10.0)), Point::new(0.05, 0.1));
    assert_point_eq(vp.normalize(Point::new(110.0, 10.0)), Point::new(0.55, 0.1));
}

#[test]
fn normalize_ignores_dpr() {
    let a = Viewport::new(200.0, 100.0, 1.0).normalize(Point::new(50.0, 25.0));
    let b = Viewport::new(200.0, 100.0, 2.0).normalize(Point::new(50.0, 25.0));
    assert_point_eq(a, b);
}

#[test]
fn normalize_on_empty_box_maps_to_origin() {
    let p = Viewport::default().normalize(Point::new(10.0, 10.0));
    assert_point_eq(p, Point::new(0.0, 0.0));
    assert!(p.is_finite());
}

#[test]
fn denormalize_against_a_different_box_scales_proportionally() {
    let drawn_on = Viewport::new(200.0, 100.0, 1.0);
    let replayed_on = Viewport::new(400.0, 300.0, 2.0);
    let n = drawn_on.normalize(Point::new(10.0, 10.0));
    assert_point_eq(replayed_on.denormalize(n), Point::new(20.0, 30.0));
}

#[test]
fn point_is_finite_rejects_nan_and_infinity() {
    assert!(Point::new(0.0, 1.0).is_finite());
    assert!(!Point::new(f64::NAN, 1.0).is_finite());
    assert!(!Point::new(0.0, f64::NEG_INFINITY).is_finite());
}
