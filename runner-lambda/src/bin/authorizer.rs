use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use udagram_core::auth::{AuthorizerRequest, AuthorizerResponse, TokenVerifier, authorize};

async fn function_handler(
    event: LambdaEvent<AuthorizerRequest>,
    verifier: &TokenVerifier,
) -> Result<AuthorizerResponse, Error> {
    Ok(authorize(verifier, &event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let runtime = udagram_lambda::bootstrap("authorizer").await?;
    let verifier = runtime.token_verifier()?;

    run(service_fn(|event| function_handler(event, &verifier))).await
}
