use aws_lambda_events::apigw::ApiGatewayWebsocketProxyRequest;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use udagram_core::store::DynamoDbStore;
use udagram_core::websocket::{RouteResponse, connect};

async fn function_handler(
    event: LambdaEvent<ApiGatewayWebsocketProxyRequest>,
    store: &DynamoDbStore,
) -> Result<RouteResponse, Error> {
    let connection_id = event.payload.request_context.connection_id.as_deref();
    Ok(connect(store, connection_id).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("connect").await?;
    let store = runtime.store();

    run(service_fn(|event| function_handler(event, &store))).await
}
