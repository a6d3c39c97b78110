use lambda_http::{Error, Request, run, service_fn};
use udagram_core::http::get_image;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("get-image").await?;
    let store = runtime.store();

    run(service_fn(|request: Request| {
        let store = &store;
        async move { get_image(store, &request).await }
    }))
    .await
}
