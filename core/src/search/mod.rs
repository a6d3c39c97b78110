//! Keeps the image search index in step with the Images table stream.

pub mod elasticsearch;
pub mod stream;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::errors::Result;
use crate::models::ImageDocument;
use crate::telemetry::BatchMetrics;

pub use elasticsearch::ElasticsearchIndex;
pub use stream::{StreamEvent, image_document, is_insert};

#[async_trait]
pub trait ImageIndex: Send + Sync {
    /// Creates or replaces the document for `document.image_id`.
    async fn index_image(&self, document: &ImageDocument) -> Result<()>;
}

pub async fn sync_images(index: &dyn ImageIndex, event: &StreamEvent) -> BatchMetrics {
    let mut metrics = BatchMetrics::default();

    for record in &event.records {
        metrics.records += 1;

        if !is_insert(record) {
            metrics.skipped += 1;
            continue;
        }

        let document = match image_document(record) {
            Ok(document) => document,
            Err(e) => {
                warn!(event_id = %record.event_id, "Unusable stream record, skipping: {}", e);
                metrics.skipped += 1;
                continue;
            }
        };

        match index.index_image(&document).await {
            Ok(()) => {
                info!(image_id = %document.image_id, "Indexed image");
                metrics.processed += 1;
            }
            Err(e) => {
                error!("Failed to index image {}: {}", document.image_id, e);
                metrics.failed += 1;
            }
        }
    }

    metrics
}
