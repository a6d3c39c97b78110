use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UdagramConfig {
    pub tables: TableConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub websocket: Option<WebSocketConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableConfig {
    pub groups: String,
    pub images: String,
    #[serde(default = "default_image_id_index")]
    pub image_id_index: String,
    pub connections: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub region: String,
    pub images_bucket: String,
    pub thumbnails_bucket: String,
    #[serde(default = "default_signed_url_expiration")]
    pub signed_url_expiration_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TokenAlgorithm {
    #[serde(rename = "RS256", alias = "rs256")]
    Rs256,
    #[serde(rename = "HS256", alias = "hs256")]
    Hs256,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub algorithm: TokenAlgorithm,
    /// PEM encoded RSA public key for RS256, shared secret for HS256.
    pub key: String,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub endpoint: String,
    #[serde(default = "default_search_index")]
    pub index: String,
    #[serde(default = "default_search_doc_type")]
    pub doc_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebSocketConfig {
    pub api_id: String,
    pub stage: String,
    pub region: String,
}

fn default_image_id_index() -> String {
    "ImageIdIndex".to_string()
}

fn default_signed_url_expiration() -> u64 {
    300
}

fn default_search_index() -> String {
    "images-index".to_string()
}

fn default_search_doc_type() -> String {
    "images".to_string()
}

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<UdagramConfig> {
    let config = match config_path {
        Some(path) => UdagramConfig::from_file(path)?,
        None => UdagramConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingField {
        field: name.to_string(),
    })
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

impl UdagramConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: UdagramConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Reads the whole configuration from `UDAGRAM_CONFIG` when it is set,
    /// otherwise from the per-resource variables the deployment exports.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Some(config_str) = optional_env("UDAGRAM_CONFIG") {
            let config: UdagramConfig = serde_yaml::from_str(&config_str)?;
            return Ok(config);
        }

        let tables = TableConfig {
            groups: required_env("GROUPS_TABLE")?,
            images: required_env("IMAGES_TABLE")?,
            image_id_index: optional_env("IMAGE_ID_INDEX").unwrap_or_else(default_image_id_index),
            connections: required_env("CONNECTIONS_TABLE")?,
        };

        let signed_url_expiration_secs = match optional_env("SIGNED_URL_EXPIRATION") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                message: format!("SIGNED_URL_EXPIRATION must be a number of seconds, got {value}"),
            })?,
            None => default_signed_url_expiration(),
        };

        let region = optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());

        let storage = StorageConfig {
            region: region.clone(),
            images_bucket: required_env("IMAGES_S3_BUCKET")?,
            thumbnails_bucket: required_env("THUMBNAILS_S3_BUCKET")?,
            signed_url_expiration_secs,
        };

        let algorithm = match optional_env("AUTH_ALGORITHM").as_deref() {
            None | Some("RS256") | Some("rs256") => TokenAlgorithm::Rs256,
            Some("HS256") | Some("hs256") => TokenAlgorithm::Hs256,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    message: format!("Unsupported AUTH_ALGORITHM {other}"),
                }
                .into());
            }
        };
        let key = optional_env("AUTH_KEY")
            .or_else(|| optional_env("AUTH_0_SECRET"))
            .ok_or_else(|| ConfigError::MissingField {
                field: "AUTH_KEY".to_string(),
            })?;

        let auth = AuthConfig {
            algorithm,
            key,
            audience: optional_env("AUTH_AUDIENCE"),
            issuer: optional_env("AUTH_ISSUER"),
        };

        let search = optional_env("ES_ENDPOINT").map(|endpoint| SearchConfig {
            endpoint,
            index: optional_env("ES_INDEX").unwrap_or_else(default_search_index),
            doc_type: optional_env("ES_DOC_TYPE").unwrap_or_else(default_search_doc_type),
        });

        let websocket = match (optional_env("API_ID"), optional_env("STAGE")) {
            (Some(api_id), Some(stage)) => Some(WebSocketConfig {
                api_id,
                stage,
                region,
            }),
            _ => None,
        };

        Ok(Self {
            tables,
            storage,
            auth,
            search,
            websocket,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tables.groups.is_empty() {
            return Err(anyhow::anyhow!("Groups table name cannot be empty"));
        }
        if self.tables.images.is_empty() {
            return Err(anyhow::anyhow!("Images table name cannot be empty"));
        }
        if self.tables.image_id_index.is_empty() {
            return Err(anyhow::anyhow!("Image id index name cannot be empty"));
        }
        if self.tables.connections.is_empty() {
            return Err(anyhow::anyhow!("Connections table name cannot be empty"));
        }
        if self.storage.images_bucket.is_empty() {
            return Err(anyhow::anyhow!("Images bucket cannot be empty"));
        }
        if self.storage.thumbnails_bucket.is_empty() {
            return Err(anyhow::anyhow!("Thumbnails bucket cannot be empty"));
        }
        if self.storage.signed_url_expiration_secs == 0 {
            return Err(anyhow::anyhow!("Signed url expiration must be greater than zero"));
        }
        if self.auth.key.trim().is_empty() {
            return Err(anyhow::anyhow!("Auth key cannot be empty"));
        }
        if let Some(search) = &self.search {
            if search.endpoint.is_empty() {
                return Err(anyhow::anyhow!("Search endpoint cannot be empty"));
            }
        }
        if let Some(websocket) = &self.websocket {
            if websocket.api_id.is_empty() || websocket.stage.is_empty() {
                return Err(anyhow::anyhow!("WebSocket api id and stage cannot be empty"));
            }
        }
        Ok(())
    }

    pub fn image_url(&self, image_id: &str) -> String {
        self.storage.image_url(image_id)
    }
}

impl StorageConfig {
    /// Public URL an uploaded image is served from.
    pub fn image_url(&self, image_id: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.images_bucket, image_id)
    }
}

impl WebSocketConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}.execute-api.{}.amazonaws.com/{}",
            self.api_id,
            self.region,
            self.stage.trim_matches('/')
        )
    }
}

#[cfg(test)]
pub(crate) fn create_test_config() -> UdagramConfig {
    UdagramConfig {
        tables: TableConfig {
            groups: "Groups-test".to_string(),
            images: "Images-test".to_string(),
            image_id_index: "ImageIdIndex".to_string(),
            connections: "Connections-test".to_string(),
        },
        storage: StorageConfig {
            region: "us-east-1".to_string(),
            images_bucket: "udagram-images-test".to_string(),
            thumbnails_bucket: "udagram-thumbnails-test".to_string(),
            signed_url_expiration_secs: 300,
        },
        auth: AuthConfig {
            algorithm: TokenAlgorithm::Hs256,
            key: "test-secret".to_string(),
            audience: None,
            issuer: None,
        },
        search: Some(SearchConfig {
            endpoint: "http://localhost:9200".to_string(),
            index: "images-index".to_string(),
            doc_type: "images".to_string(),
        }),
        websocket: Some(WebSocketConfig {
            api_id: "abc123".to_string(),
            stage: "dev".to_string(),
            region: "us-east-1".to_string(),
        }),
    }
}
