use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::info;
use udagram_core::BatchMetrics;
use udagram_core::search::{ElasticsearchIndex, StreamEvent, sync_images};

async fn function_handler(
    event: LambdaEvent<StreamEvent>,
    index: &ElasticsearchIndex,
) -> Result<BatchMetrics, Error> {
    let metrics = sync_images(index, &event.payload).await;
    info!(?metrics, "Processed stream batch");
    Ok(metrics)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("elasticsearch-sync").await?;
    let index = runtime.search_index()?;

    run(service_fn(|event| function_handler(event, &index))).await
}
