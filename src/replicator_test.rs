use super::*;
use crate::brush::Brush;
use crate::geometry::{Point, Viewport};
use crate::notify::RecordingNotifier;
use crate::raster::DisplayList;
use crate::store::MemoryStore;
use tokio::time::timeout;

struct Fixture {
    store: Arc<MemoryStore>,
    surface: SharedSurface<DisplayList>,
    notifier: Arc<RecordingNotifier>,
    replicator: StrokeReplicator<DisplayList>,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let mut surface = DrawSurface::new(DisplayList::new(), Brush::default());
    surface.resize(Viewport::new(200.0, 100.0, 1.0));
    let surface = Arc::new(Mutex::new(surface));
    let notifier = Arc::new(RecordingNotifier::new());
    let replicator = StrokeReplicator::new(
        store.clone(),
        surface.clone(),
        notifier.clone(),
        Duration::from_millis(5),
        Handle::current(),
    );
    Fixture { store, surface, notifier, replicator }
}

fn seg(x: f64) -> Segment {
    Segment::new(Point::new(x, 0.5), Point::new(x + 0.05, 0.5), "#000000", 3.0)
}

async fn settle(replicator: &StrokeReplicator<DisplayList>) {
    timeout(Duration::from_secs(2), replicator.wait_idle())
        .await
        .expect("flush never went idle");
}

fn line_count(surface: &SharedSurface<DisplayList>) -> usize {
    lock(surface).raster().lines().len()
}

// =============================================================================
// enqueue / flush
// =============================================================================

#[tokio::test]
async fn segments_queued_together_go_out_in_one_batch() {
    let f = fixture();
    f.replicator.enqueue(seg(0.1));
    f.replicator.enqueue(seg(0.2));
    f.replicator.enqueue(seg(0.3));
    assert_eq!(f.replicator.state(), FlushState::Flushing);

    settle(&f.replicator).await;

    let batches = f.store.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 3);
    assert_eq!(f.replicator.state(), FlushState::Idle);
    assert_eq!(f.replicator.pending_len(), 0);
}

#[tokio::test]
async fn segments_queued_during_a_write_go_out_in_the_next_batch() {
    let f = fixture();
    let hold = f.store.hold_inserts().await;

    f.replicator.enqueue(seg(0.1));
    timeout(Duration::from_secs(2), async {
        while f.store.insert_attempts() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("first write never started");

    // The first batch is in flight; these must wait for the next one.
    f.replicator.enqueue(seg(0.2));
    f.replicator.enqueue(seg(0.3));
    assert_eq!(f.replicator.pending_len(), 2);
    assert_eq!(f.replicator.state(), FlushState::Flushing);

    drop(hold);
    settle(&f.replicator).await;

    let batches = f.store.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[1].len(), 2);

    let xs: Vec<f64> = f.store.rows().iter().map(|r| r.start.x).collect();
    assert_eq!(xs, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn failed_batch_is_dropped_and_flushing_recovers() {
    let f = fixture();
    f.store.fail_next_insert();

    f.replicator.enqueue(seg(0.1));
    settle(&f.replicator).await;
    assert!(f.store.rows().is_empty());
    assert_eq!(f.store.insert_attempts(), 1);

    f.replicator.enqueue(seg(0.2));
    settle(&f.replicator).await;
    let rows = f.store.rows();
    assert_eq!(rows.len(), 1);
    assert!((rows[0].start.x - 0.2).abs() < f64::EPSILON);
}

#[test]
fn enqueue_from_a_non_runtime_thread_flushes_on_the_given_runtime() {
    let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build().unwrap();
    let f = runtime.block_on(async { fixture() });

    let replicator = f.replicator.clone();
    std::thread::spawn(move || replicator.enqueue(seg(0.1))).join().unwrap();

    runtime.block_on(settle(&f.replicator));
    assert_eq!(f.store.rows().len(), 1);
}

#[tokio::test]
async fn wait_idle_returns_at_once_when_nothing_is_queued() {
    let f = fixture();
    settle(&f.replicator).await;
    assert_eq!(f.store.insert_attempts(), 0);
}

// =============================================================================
// load / remote changes
// =============================================================================

#[tokio::test]
async fn load_all_replays_rows_oldest_first() {
    let f = fixture();
    f.store.insert_batch(&[seg(0.1), seg(0.5)]).await.unwrap();

    assert_eq!(f.replicator.load_all().await, 2);

    let surface = lock(&f.surface);
    let lines = surface.raster().lines();
    assert_eq!(lines.len(), 2);
    assert!((lines[0].from.x - 20.0).abs() < 1e-9);
    assert!((lines[1].from.x - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn failed_load_leaves_surface_alone() {
    let f = fixture();
    f.replicator.on_remote_insert(&seg(0.1));
    f.store.fail_next_query();

    assert_eq!(f.replicator.load_all().await, 0);
    assert_eq!(line_count(&f.surface), 1);
}

#[tokio::test]
async fn remote_insert_is_drawn_even_when_already_present() {
    let f = fixture();
    let segment = seg(0.1);
    f.replicator.on_remote_insert(&segment);
    f.replicator.on_remote_insert(&segment);
    assert_eq!(line_count(&f.surface), 2);
}

#[tokio::test]
async fn remote_delete_clears_then_reloads() {
    let f = fixture();
    f.store.insert_batch(&[seg(0.1)]).await.unwrap();
    for x in [0.2, 0.3, 0.4] {
        f.replicator.on_remote_insert(&seg(x));
    }

    f.replicator.apply(StoreEvent::Delete).await;

    assert_eq!(line_count(&f.surface), 1);
}

#[tokio::test]
async fn apply_routes_inserts_to_the_surface() {
    let f = fixture();
    f.replicator.apply(StoreEvent::Insert { record: seg(0.1) }).await;
    assert_eq!(line_count(&f.surface), 1);
}

// =============================================================================
// clear
// =============================================================================

#[tokio::test]
async fn clear_all_empties_store_and_surface() {
    let f = fixture();
    f.store.insert_batch(&[seg(0.1), seg(0.2)]).await.unwrap();
    f.replicator.load_all().await;
    assert_eq!(line_count(&f.surface), 2);

    f.replicator.clear_all().await.unwrap();

    assert_eq!(line_count(&f.surface), 0);
    assert_eq!(f.replicator.load_all().await, 0);
    assert!(f.notifier.messages().is_empty());
}

#[tokio::test]
async fn failed_clear_notifies_and_keeps_the_drawing() {
    let f = fixture();
    f.store.insert_batch(&[seg(0.1)]).await.unwrap();
    f.replicator.load_all().await;
    f.store.fail_next_delete();

    assert!(f.replicator.clear_all().await.is_err());

    assert_eq!(line_count(&f.surface), 1);
    assert_eq!(f.store.rows().len(), 1);
    assert_eq!(f.notifier.messages(), vec![CLEAR_FAILED_MESSAGE.to_owned()]);
}
