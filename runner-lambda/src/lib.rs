//! Bootstrap shared by every function binary.

use anyhow::Context;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;
use udagram_core::auth::TokenVerifier;
use udagram_core::config::load_config;
use udagram_core::media::S3ImageStorage;
use udagram_core::notifications::ApiGatewayNotifier;
use udagram_core::search::ElasticsearchIndex;
use udagram_core::store::DynamoDbStore;
use udagram_core::{UdagramConfig, init_tracing};

/// Configuration and AWS settings resolved once per cold start.
pub struct Runtime {
    pub config: UdagramConfig,
    pub sdk_config: SdkConfig,
}

pub async fn sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Installs the subscriber, then loads the configuration from the function's
/// environment. `UDAGRAM_CONFIG_PATH` points at a YAML file instead.
pub async fn bootstrap(function: &str) -> anyhow::Result<Runtime> {
    init_tracing();

    let path = std::env::var("UDAGRAM_CONFIG_PATH").ok();
    let config = load_config(path.as_deref())
        .with_context(|| format!("Failed to load configuration for {function}"))?;
    let sdk_config = sdk_config(&config.storage.region).await;

    info!(function, region = %config.storage.region, "Cold start complete");
    Ok(Runtime { config, sdk_config })
}

impl Runtime {
    pub fn store(&self) -> DynamoDbStore {
        DynamoDbStore::new(
            aws_sdk_dynamodb::Client::new(&self.sdk_config),
            self.config.tables.clone(),
        )
    }

    pub fn image_storage(&self) -> S3ImageStorage {
        S3ImageStorage::new(
            aws_sdk_s3::Client::new(&self.sdk_config),
            self.config.storage.clone(),
        )
    }

    pub fn token_verifier(&self) -> anyhow::Result<TokenVerifier> {
        Ok(TokenVerifier::from_config(&self.config.auth)?)
    }

    pub fn notifier(&self) -> anyhow::Result<ApiGatewayNotifier> {
        let websocket = self
            .config
            .websocket
            .as_ref()
            .context("API_ID and STAGE must be set to notify WebSocket clients")?;
        Ok(ApiGatewayNotifier::from_sdk_config(&self.sdk_config, websocket))
    }

    pub fn search_index(&self) -> anyhow::Result<ElasticsearchIndex> {
        let search = self
            .config
            .search
            .clone()
            .context("ES_ENDPOINT must be set to sync the search index")?;
        Ok(ElasticsearchIndex::from_sdk_config(&self.sdk_config, search)?)
    }
}
