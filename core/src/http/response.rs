use lambda_http::http::StatusCode;
use lambda_http::{Body, Error, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::errors::UdagramError;

/// JSON response with the CORS headers every route answers with.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(body)?;
    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Credentials", "true")
        .body(Body::from(body))?;
    Ok(response)
}

pub fn error_response(err: &UdagramError) -> Result<Response<Body>, Error> {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    json_response(status, &json!({ "error": err.client_message() }))
}

/// Serialises a handler outcome: `status` on success, the error's own status otherwise.
pub fn respond<T: Serialize>(
    status: StatusCode,
    outcome: crate::errors::Result<T>,
) -> Result<Response<Body>, Error> {
    match outcome {
        Ok(body) => json_response(status, &body),
        Err(e) => error_response(&e),
    }
}
