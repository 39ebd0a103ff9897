use super::*;
use serde_json::json;

fn sample() -> Segment {
    Segment::new(Point::new(0.05, 0.1), Point::new(0.55, 0.1), "#000000", 3.0)
}

// =============================================================================
// Wire format
// =============================================================================

#[test]
fn unpersisted_segment_serializes_without_store_fields() {
    let value = serde_json::to_value(sample()).unwrap();
    assert_eq!(
        value,
        json!({"x0": 0.05, "y0": 0.1, "x1": 0.55, "y1": 0.1, "color": "#000000", "width": 3.0})
    );
}

#[test]
fn persisted_row_decodes_into_segment() {
    let row = json!({
        "id": 42,
        "x0": 0.25, "y0": 0.5, "x1": 0.75, "y1": 0.5,
        "color": "#ff0000",
        "width": 6,
        "created_at": 1_700_000_000_000_i64,
    });
    let segment: Segment = serde_json::from_value(row).unwrap();
    assert_eq!(segment.id, Some(42));
    assert_eq!(segment.start, Point::new(0.25, 0.5));
    assert_eq!(segment.end, Point::new(0.75, 0.5));
    assert_eq!(segment.color, "#ff0000");
    assert!((segment.stroke_width - 6.0).abs() < f64::EPSILON);
    assert_eq!(segment.created_at, Some(1_700_000_000_000));
    assert!(segment.is_persisted());
}

#[test]
fn decode_ignores_unknown_columns() {
    let row = json!({
        "x0": 0.0, "y0": 0.0, "x1": 1.0, "y1": 1.0,
        "color": "#000", "width": 1.0, "board": "main"
    });
    let segment: Segment = serde_json::from_value(row).unwrap();
    assert!(!segment.is_persisted());
    assert!(segment.created_at.is_none());
}

#[test]
fn decode_rejects_missing_coordinate() {
    let row = json!({"x0": 0.0, "y0": 0.0, "x1": 1.0, "color": "#000", "width": 1.0});
    assert!(serde_json::from_value::<Segment>(row).is_err());
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn validate_accepts_well_formed_segment() {
    assert_eq!(sample().validate(), Ok(()));
}

#[test]
fn validate_accepts_endpoints_outside_unit_box() {
    let segment = Segment::new(Point::new(-0.2, 0.5), Point::new(1.3, 1.1), "#000", 2.0);
    assert_eq!(segment.validate(), Ok(()));
}

#[test]
fn validate_rejects_non_finite_endpoint() {
    let segment = Segment::new(Point::new(f64::NAN, 0.5), Point::new(0.3, 0.1), "#000", 2.0);
    assert_eq!(segment.validate(), Err(SegmentError::NonFiniteEndpoint));
}

#[test]
fn validate_rejects_zero_width() {
    let mut segment = sample();
    segment.stroke_width = 0.0;
    assert!(matches!(segment.validate(), Err(SegmentError::InvalidWidth(_))));
}

#[test]
fn validate_rejects_named_color() {
    let mut segment = sample();
    segment.color = "red".into();
    assert_eq!(segment.validate(), Err(SegmentError::InvalidColor("red".into())));
}
