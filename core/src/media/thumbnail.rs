use std::io::Cursor;

use aws_lambda_events::event::s3::S3Event;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{error, info, warn};

use super::{ImageStorage, decode_object_key};
use crate::errors::{MediaError, Result};
use crate::telemetry::BatchMetrics;

pub const THUMBNAIL_WIDTH: u32 = 150;

/// Scales an image to `THUMBNAIL_WIDTH` pixels wide, keeping its aspect
/// ratio, and re-encodes it as JPEG.
pub fn resize(key: &str, bytes: &[u8]) -> std::result::Result<Vec<u8>, MediaError> {
    let image_error = |reason: String| MediaError::Image {
        key: key.to_string(),
        reason,
    };

    let image = image::load_from_memory(bytes).map_err(|e| image_error(e.to_string()))?;
    let thumbnail = image.resize(THUMBNAIL_WIDTH, u32::MAX, FilterType::Triangle);

    // JPEG has no alpha channel.
    let thumbnail = DynamicImage::ImageRgb8(thumbnail.to_rgb8());

    let mut buffer = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| image_error(e.to_string()))?;

    Ok(buffer.into_inner())
}

pub fn thumbnail_key(key: &str) -> String {
    format!("{key}.jpeg")
}

async fn process_record(storage: &dyn ImageStorage, bucket: &str, key: &str) -> Result<()> {
    let bytes = storage.fetch_image(bucket, key).await?;
    info!("Resizing s3://{}/{} ({} bytes)", bucket, key, bytes.len());

    let owned_key = key.to_string();
    let thumbnail = tokio::task::spawn_blocking(move || resize(&owned_key, &bytes))
        .await
        .map_err(|e| MediaError::Image {
            key: key.to_string(),
            reason: e.to_string(),
        })??;

    storage.store_thumbnail(&thumbnail_key(key), thumbnail).await
}

/// Writes a thumbnail for every object in the event. One bad record does not
/// stop the rest of the batch.
pub async fn process_s3_event(storage: &dyn ImageStorage, event: &S3Event) -> BatchMetrics {
    let mut metrics = BatchMetrics::default();

    for record in &event.records {
        metrics.records += 1;

        let (Some(bucket), Some(raw_key)) = (
            record.s3.bucket.name.as_deref(),
            record.s3.object.key.as_deref(),
        ) else {
            warn!("S3 record without bucket or key, skipping");
            metrics.skipped += 1;
            continue;
        };
        let Some(key) = decode_object_key(raw_key) else {
            warn!("S3 key {} is not valid UTF-8 once decoded, skipping", raw_key);
            metrics.skipped += 1;
            continue;
        };

        match process_record(storage, bucket, &key).await {
            Ok(()) => metrics.processed += 1,
            Err(e) => {
                error!("Failed to create thumbnail for {}: {}", key, e);
                metrics.failed += 1;
            }
        }
    }

    metrics
}
