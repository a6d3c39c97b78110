use lambda_http::{Error, Request, run, service_fn};
use udagram_core::http::get_groups;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("get-groups").await?;
    let store = runtime.store();

    run(service_fn(|request: Request| {
        let store = &store;
        async move { get_groups(store, &request).await }
    }))
    .await
}
