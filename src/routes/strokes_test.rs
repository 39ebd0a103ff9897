use super::*;
use crate::geometry::Point;
use crate::state::test_helpers::test_app_state;
use crate::store::RemoteStore;

fn seg(x: f64) -> Segment {
    Segment::new(Point::new(x, 0.2), Point::new(x, 0.8), "#00ff00", 6.0)
}

#[tokio::test]
async fn insert_stores_batch_and_returns_created() {
    let (state, store) = test_app_state();
    let status = insert_strokes(State(state), Json(vec![seg(0.1), seg(0.2)])).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.batches().len(), 1);
    assert_eq!(store.rows().len(), 2);
}

#[tokio::test]
async fn insert_accepts_points_off_the_surface() {
    let (state, store) = test_app_state();
    let off = Segment::new(Point::new(0.9, 0.5), Point::new(1.3, -0.2), "#000", 3.0);
    assert_eq!(insert_strokes(State(state), Json(vec![off])).await, Ok(StatusCode::CREATED));
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn insert_rejects_whole_batch_on_one_bad_row() {
    let (state, store) = test_app_state();

    let mut bad_color = seg(0.3);
    bad_color.color = "green".into();
    let result = insert_strokes(State(state.clone()), Json(vec![seg(0.1), bad_color])).await;
    assert_eq!(result, Err(StatusCode::BAD_REQUEST));

    let mut bad_width = seg(0.3);
    bad_width.stroke_width = 0.0;
    let result = insert_strokes(State(state.clone()), Json(vec![bad_width])).await;
    assert_eq!(result, Err(StatusCode::BAD_REQUEST));

    let mut bad_point = seg(0.3);
    bad_point.end.x = f64::NAN;
    let result = insert_strokes(State(state), Json(vec![bad_point])).await;
    assert_eq!(result, Err(StatusCode::BAD_REQUEST));

    assert!(store.rows().is_empty());
    assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let (state, store) = test_app_state();
    assert_eq!(insert_strokes(State(state), Json(Vec::new())).await, Ok(StatusCode::CREATED));
    assert_eq!(store.insert_attempts(), 0);
}

#[tokio::test]
async fn list_returns_rows_in_creation_order() {
    let (state, store) = test_app_state();
    store.insert_batch(&[seg(0.1)]).await.unwrap();
    store.insert_batch(&[seg(0.2), seg(0.3)]).await.unwrap();

    let Json(rows) = list_strokes(State(state)).await.unwrap();
    let xs: Vec<f64> = rows.iter().map(|r| r.start.x).collect();
    assert_eq!(xs, vec![0.1, 0.2, 0.3]);
    assert!(rows.iter().all(Segment::is_persisted));
}

#[tokio::test]
async fn delete_clears_and_returns_no_content() {
    let (state, store) = test_app_state();
    store.insert_batch(&[seg(0.1)]).await.unwrap();
    assert_eq!(delete_strokes(State(state)).await, Ok(StatusCode::NO_CONTENT));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn store_failures_map_to_server_error() {
    let (state, store) = test_app_state();

    store.fail_next_query();
    let err = list_strokes(State(state.clone())).await.unwrap_err();
    assert_eq!(err, StatusCode::INTERNAL_SERVER_ERROR);

    store.fail_next_insert();
    let result = insert_strokes(State(state.clone()), Json(vec![seg(0.1)])).await;
    assert_eq!(result, Err(StatusCode::INTERNAL_SERVER_ERROR));

    store.fail_next_delete();
    assert_eq!(delete_strokes(State(state)).await, Err(StatusCode::INTERNAL_SERVER_ERROR));
}

#[test]
fn store_error_to_status_maps_upstream_and_input_errors() {
    assert_eq!(store_error_to_status(StoreError::Status(503)), StatusCode::BAD_GATEWAY);
    assert_eq!(
        store_error_to_status(StoreError::InvalidSegment(SegmentError::NonFiniteEndpoint)),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(store_error_to_status(StoreError::Injected("query")), StatusCode::INTERNAL_SERVER_ERROR);
}
