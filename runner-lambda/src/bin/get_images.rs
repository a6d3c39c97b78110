use lambda_http::{Error, Request, run, service_fn};
use udagram_core::http::get_images;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("get-images").await?;
    let store = runtime.store();

    run(service_fn(|request: Request| {
        let store = &store;
        async move { get_images(store, store, &request).await }
    }))
    .await
}
