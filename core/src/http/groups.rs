use lambda_http::http::StatusCode;
use lambda_http::{Body, Error, Request, Response};
use serde_json::{Value, json};
use tracing::info;

use super::{parse_body, query_parameter, respond, user_id};
use crate::errors::{RequestError, Result};
use crate::models::{Group, NewGroup, Page};
use crate::store::GroupStore;

fn parse_limit(raw: Option<String>) -> std::result::Result<Option<i32>, RequestError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.parse::<i32>() {
        Ok(limit) if limit > 0 => Ok(Some(limit)),
        _ => Err(RequestError::InvalidQueryParameter {
            name: "limit",
            reason: format!("expected a positive integer, got {raw}"),
        }),
    }
}

async fn list_groups(store: &dyn GroupStore, request: &Request) -> Result<Page<Group>> {
    let limit = parse_limit(query_parameter(request, "limit"))?;
    let next_key = query_parameter(request, "nextKey");

    info!(?limit, ?next_key, "Listing groups");
    store.list_groups(limit, next_key).await
}

async fn add_group(store: &dyn GroupStore, request: &Request) -> Result<Value> {
    let new_group: NewGroup = parse_body(request)?;
    new_group.validate()?;

    let user_id = user_id(request)?;
    let group = new_group.into_group(uuid::Uuid::new_v4().to_string(), Some(user_id));

    store.create_group(&group).await?;
    info!(group_id = %group.id, "Created group");

    Ok(json!({ "newItem": group }))
}

/// `GET /groups`
pub async fn get_groups(store: &dyn GroupStore, request: &Request) -> std::result::Result<Response<Body>, Error> {
    respond(StatusCode::OK, list_groups(store, request).await)
}

/// `POST /groups`
pub async fn create_group(store: &dyn GroupStore, request: &Request) -> std::result::Result<Response<Body>, Error> {
    respond(StatusCode::CREATED, add_group(store, request).await)
}
