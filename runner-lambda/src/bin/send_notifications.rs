use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::info;
use udagram_core::BatchMetrics;
use udagram_core::notifications::{ApiGatewayNotifier, send_upload_notifications, sns};
use udagram_core::store::DynamoDbStore;

async fn function_handler(
    event: LambdaEvent<SnsEvent>,
    store: &DynamoDbStore,
    notifier: &ApiGatewayNotifier,
) -> Result<BatchMetrics, Error> {
    let mut metrics = BatchMetrics::default();

    for s3_event in sns::s3_events(&event.payload)? {
        let batch = send_upload_notifications(store, notifier, &s3_event).await?;
        metrics.merge(&batch);
    }

    info!(?metrics, "Notifications sent");
    Ok(metrics)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("send-notifications").await?;
    let store = runtime.store();
    let notifier = runtime.notifier()?;

    run(service_fn(|event| function_handler(event, &store, &notifier))).await
}
