//! Postgres-backed store.
//!
//! DESIGN
//! ======
//! Rows live in `canvas_strokes`. Row triggers publish every insert, and a
//! statement trigger publishes every delete, on the `canvas_changes` channel
//! as the same JSON the WebSocket feed uses, so a subscription is just a
//! `PgListener` that decodes and forwards.
//!
//! ERROR HANDLING
//! ==============
//! When the listener's connection drops, notifications sent while it was
//! down are lost. The forwarder reports that as a `Delete` so subscribers
//! clear and reload instead of silently missing strokes.

use sqlx::postgres::PgListener;
use sqlx::{PgPool, QueryBuilder};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{RemoteStore, StoreError, StoreEvent, Subscription};
use crate::consts::{CHANGE_CHANNEL, INSERT_CHUNK_ROWS, SUBSCRIPTION_CAPACITY};
use crate::geometry::Point;
use crate::segment::Segment;

#[cfg(test)]
#[path = "postgres_test.rs"]
mod postgres_test;

type StrokeRow = (i64, f64, f64, f64, f64, String, f64, i64);

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_segment((id, x0, y0, x1, y1, color, width, created_at): StrokeRow) -> Segment {
    Segment {
        id: Some(id),
        start: Point::new(x0, y0),
        end: Point::new(x1, y1),
        color,
        stroke_width: width,
        created_at: Some(created_at),
    }
}

/// Build one multi-row `INSERT` for a chunk of segments.
fn insert_statement(rows: &[Segment]) -> QueryBuilder<'_, sqlx::Postgres> {
    let mut builder = QueryBuilder::new("INSERT INTO canvas_strokes (x0, y0, x1, y1, color, width) ");
    builder.push_values(rows, |mut values, row| {
        values
            .push_bind(row.start.x)
            .push_bind(row.start.y)
            .push_bind(row.end.x)
            .push_bind(row.end.y)
            .push_bind(row.color.as_str())
            .push_bind(row.stroke_width);
    });
    builder
}

/// Decode one `NOTIFY` payload.
fn decode_notification(payload: &str) -> Result<StoreEvent, StoreError> {
    Ok(serde_json::from_str(payload)?)
}

#[async_trait::async_trait]
impl RemoteStore for PgStore {
    async fn insert_batch(&self, rows: &[Segment]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let mut statement = insert_statement(chunk);
            statement.build().execute(tx.as_mut()).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM canvas_strokes").execute(&self.pool).await?;
        info!(rows = result.rows_affected(), "deleted all strokes");
        Ok(())
    }

    async fn query_all_ordered_by_creation(&self) -> Result<Vec<Segment>, StoreError> {
        let rows = sqlx::query_as::<_, StrokeRow>(
            "SELECT id, x0, y0, x1, y1, color, width, created_at \
             FROM canvas_strokes ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_segment).collect())
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);

        let forwarder = tokio::spawn(async move {
            loop {
                let event = match listener.try_recv().await {
                    Ok(Some(notification)) => match decode_notification(notification.payload()) {
                        Ok(event) => event,
                        Err(e) => {
                            warn!(error = %e, payload = notification.payload(), "undecodable change notification");
                            continue;
                        }
                    },
                    Ok(None) => {
                        warn!("change listener reconnecting; requesting resync");
                        StoreEvent::Delete
                    }
                    Err(e) => {
                        error!(error = %e, "change listener failed");
                        break;
                    }
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(Subscription::new(rx, Some(forwarder)))
    }
}
