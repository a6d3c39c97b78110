use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::info;
use udagram_core::BatchMetrics;
use udagram_core::media::S3ImageStorage;
use udagram_core::media::thumbnail::process_s3_event;
use udagram_core::notifications::sns;

async fn function_handler(
    event: LambdaEvent<SnsEvent>,
    storage: &S3ImageStorage,
) -> Result<BatchMetrics, Error> {
    let mut metrics = BatchMetrics::default();

    for s3_event in sns::s3_events(&event.payload)? {
        metrics.merge(&process_s3_event(storage, &s3_event).await);
    }

    info!(?metrics, "Thumbnails written");
    Ok(metrics)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("resize-image").await?;
    let storage = runtime.image_storage();

    run(service_fn(|event| function_handler(event, &storage))).await
}
