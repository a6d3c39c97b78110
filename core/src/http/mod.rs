//! API Gateway handlers for the REST routes.

pub mod groups;
pub mod images;
pub mod response;

use lambda_http::http::header::AUTHORIZATION;
use lambda_http::{Request, RequestExt};
use serde::de::DeserializeOwned;

use crate::auth::{extract_bearer_token, user_id_from_token};
use crate::errors::{AuthError, RequestError};

pub use groups::{create_group, get_groups};
pub use images::{create_image, get_image, get_images};
pub use response::{error_response, json_response, respond};

pub(crate) fn path_parameter(request: &Request, name: &'static str) -> Result<String, RequestError> {
    request
        .path_parameters_ref()
        .and_then(|params| params.first(name))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(RequestError::MissingPathParameter { name })
}

pub(crate) fn query_parameter(request: &Request, name: &str) -> Option<String> {
    request
        .query_string_parameters_ref()
        .and_then(|params| params.first(name))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_body<T: DeserializeOwned>(request: &Request) -> Result<T, RequestError> {
    let bytes: &[u8] = request.body();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::MissingBody);
    }
    serde_json::from_slice(bytes).map_err(|e| RequestError::MalformedBody {
        reason: e.to_string(),
    })
}

pub(crate) fn authorization_header(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Caller identity from the bearer token the authorizer already accepted.
pub(crate) fn user_id(request: &Request) -> Result<String, AuthError> {
    let token = extract_bearer_token(authorization_header(request))?;
    user_id_from_token(token)
}
