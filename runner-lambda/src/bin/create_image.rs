use lambda_http::{Error, Request, run, service_fn};
use udagram_core::http::create_image;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("create-image").await?;
    let store = runtime.store();
    let storage = runtime.image_storage();
    let config = &runtime.config.storage;

    run(service_fn(|request: Request| {
        let (store, storage) = (&store, &storage);
        async move { create_image(store, store, storage, config, &request).await }
    }))
    .await
}
