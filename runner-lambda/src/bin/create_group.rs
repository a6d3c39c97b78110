use lambda_http::{Error, Request, run, service_fn};
use udagram_core::http::create_group;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("create-group").await?;
    let store = runtime.store();

    run(service_fn(|request: Request| {
        let store = &store;
        async move { create_group(store, &request).await }
    }))
    .await
}
