//! Upload notifications for connected WebSocket clients.

pub mod apigateway;
pub mod sns;

use async_trait::async_trait;
use aws_lambda_events::event::s3::S3Event;
use futures::future::join_all;
use serde_json::json;
use tracing::{error, info, warn};

use crate::errors::Result;
use crate::store::ConnectionStore;
use crate::telemetry::BatchMetrics;

pub use apigateway::ApiGatewayNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The client went away without a `$disconnect`.
    Gone,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionNotifier: Send + Sync {
    async fn post(&self, connection_id: &str, payload: &[u8]) -> Result<Delivery>;
}

/// Tells every open connection about each uploaded image in the event.
/// Connections are posted to concurrently.
/// Stale connections are dropped from the store as they are found.
pub async fn send_upload_notifications(
    store: &dyn ConnectionStore,
    notifier: &dyn ConnectionNotifier,
    event: &S3Event,
) -> Result<BatchMetrics> {
    let mut metrics = BatchMetrics::default();
    let mut connections = store.list_connections().await?;

    for record in &event.records {
        metrics.records += 1;

        let Some(key) = record.s3.object.key.as_deref() else {
            warn!("S3 record without object key, skipping");
            metrics.skipped += 1;
            continue;
        };
        info!(image_id = %key, connections = connections.len(), "Broadcasting upload");
        let payload = json!({ "imageId": key }).to_string();

        let deliveries = join_all(
            connections
                .iter()
                .map(|connection| notifier.post(&connection.id, payload.as_bytes())),
        )
        .await;

        let mut failed = false;
        let mut gone = Vec::new();
        for (connection, delivery) in connections.iter().zip(deliveries) {
            match delivery {
                Ok(Delivery::Delivered) => {}
                Ok(Delivery::Gone) => {
                    info!(connection_id = %connection.id, "Stale connection, removing");
                    if let Err(e) = store.remove_connection(&connection.id).await {
                        error!("Failed to remove connection {}: {}", connection.id, e);
                    }
                    gone.push(connection.id.clone());
                }
                Err(e) => {
                    error!("Failed to notify {}: {}", connection.id, e);
                    failed = true;
                }
            }
        }
        connections.retain(|connection| !gone.contains(&connection.id));

        if failed {
            metrics.failed += 1;
        } else {
            metrics.processed += 1;
        }
    }

    Ok(metrics)
}
