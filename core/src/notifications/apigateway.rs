use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_apigatewaymanagement::Client;
use aws_sdk_apigatewaymanagement::operation::post_to_connection::PostToConnectionError;
use aws_sdk_apigatewaymanagement::primitives::Blob;
use tracing::debug;

use super::{ConnectionNotifier, Delivery};
use crate::config::WebSocketConfig;
use crate::errors::{NotificationError, Result};

/// Pushes messages to WebSocket clients through the API Gateway management API.
pub struct ApiGatewayNotifier {
    client: Client,
}

impl ApiGatewayNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The management API lives on the WebSocket API's own endpoint, not the
    /// regional default.
    pub fn from_sdk_config(sdk_config: &SdkConfig, websocket: &WebSocketConfig) -> Self {
        let config = aws_sdk_apigatewaymanagement::config::Builder::from(sdk_config)
            .endpoint_url(websocket.endpoint())
            .build();
        Self::new(Client::from_conf(config))
    }
}

#[async_trait]
impl ConnectionNotifier for ApiGatewayNotifier {
    async fn post(&self, connection_id: &str, payload: &[u8]) -> Result<Delivery> {
        let result = self
            .client
            .post_to_connection()
            .connection_id(connection_id)
            .data(Blob::new(payload))
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(%connection_id, "Posted message");
                Ok(Delivery::Delivered)
            }
            Err(err)
                if matches!(
                    err.as_service_error(),
                    Some(PostToConnectionError::GoneException(_))
                ) =>
            {
                Ok(Delivery::Gone)
            }
            Err(err) => Err(NotificationError::Post {
                connection_id: connection_id.to_string(),
                reason: format!("{:?}", err.into_service_error()),
            }
            .into()),
        }
    }
}
