//! `$connect` / `$disconnect` routes of the WebSocket API.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{RequestError, Result};
use crate::models::Connection;
use crate::store::ConnectionStore;

/// Response shape API Gateway expects from a WebSocket route integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub status_code: u16,
    pub body: String,
}

impl RouteResponse {
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: String::new(),
        }
    }

    fn rejected(err: RequestError) -> Self {
        warn!("WebSocket route rejected: {}", err);
        Self {
            status_code: 400,
            body: err.to_string(),
        }
    }
}

pub async fn connect(store: &dyn ConnectionStore, connection_id: Option<&str>) -> Result<RouteResponse> {
    let Some(id) = connection_id.filter(|id| !id.is_empty()) else {
        return Ok(RouteResponse::rejected(RequestError::MissingConnectionId));
    };

    let connection = Connection {
        id: id.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    store.add_connection(&connection).await?;
    info!(connection_id = %id, "Connected");

    Ok(RouteResponse::ok())
}

pub async fn disconnect(store: &dyn ConnectionStore, connection_id: Option<&str>) -> Result<RouteResponse> {
    let Some(id) = connection_id.filter(|id| !id.is_empty()) else {
        return Ok(RouteResponse::rejected(RequestError::MissingConnectionId));
    };

    store.remove_connection(id).await?;
    info!(connection_id = %id, "Disconnected");

    Ok(RouteResponse::ok())
}
