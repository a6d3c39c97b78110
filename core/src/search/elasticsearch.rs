use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4;
use tracing::debug;

use super::ImageIndex;
use crate::config::SearchConfig;
use crate::errors::{Result, SearchError};
use crate::models::ImageDocument;

/// Signing name of the Elasticsearch service.
const SERVICE_NAME: &str = "es";

/// Writes image documents to an Elasticsearch domain over its REST API.
/// Requests are SigV4 signed with the function's credentials.
pub struct ElasticsearchIndex {
    client: reqwest::Client,
    config: SearchConfig,
    credentials: SharedCredentialsProvider,
    region: String,
}

impl ElasticsearchIndex {
    pub fn new(
        client: reqwest::Client,
        config: SearchConfig,
        credentials: SharedCredentialsProvider,
        region: impl Into<String>,
    ) -> Self {
        Self {
            client,
            config,
            credentials,
            region: region.into(),
        }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig, config: SearchConfig) -> Result<Self> {
        let credentials = sdk_config
            .credentials_provider()
            .ok_or_else(|| SearchError::Signing {
                reason: "no credentials provider configured".to_string(),
            })?;
        let region = sdk_config
            .region()
            .map(|region| region.to_string())
            .ok_or_else(|| SearchError::Signing {
                reason: "no region configured".to_string(),
            })?;

        Ok(Self::new(reqwest::Client::new(), config, credentials, region))
    }

    fn base_url(&self) -> String {
        let endpoint = self.config.endpoint.trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            // Domain endpoints are published without a scheme.
            format!("https://{endpoint}")
        }
    }

    pub fn document_url(&self, id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url(),
            self.config.index,
            self.config.doc_type,
            id
        )
    }

    /// Headers that authenticate `method url` with `headers` and `body` to the domain.
    async fn signature_headers(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>> {
        let signing_error = |reason: String| SearchError::Signing { reason };

        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| signing_error(e.to_string()))?;
        let identity = credentials.into();
        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SERVICE_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| signing_error(e.to_string()))?
            .into();

        let request = SignableRequest::new(
            method,
            url,
            headers.iter().copied(),
            SignableBody::Bytes(body),
        )
        .map_err(|e| signing_error(e.to_string()))?;
        let (instructions, _signature) = sign(request, &params)
            .map_err(|e| signing_error(e.to_string()))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}

#[async_trait]
impl ImageIndex for ElasticsearchIndex {
    async fn index_image(&self, document: &ImageDocument) -> Result<()> {
        let url = self.document_url(&document.image_id);
        let body = serde_json::to_vec(document)?;
        let content_type = ("content-type", "application/json");

        let mut request = self
            .client
            .put(&url)
            .header(content_type.0, content_type.1)
            .body(body.clone());
        for (name, value) in self
            .signature_headers("PUT", &url, &[content_type], &body)
            .await?
        {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| SearchError::Transport {
            endpoint: self.config.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Rejected {
                id: document.image_id.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        debug!("Indexed image {} at {}", document.image_id, url);
        Ok(())
    }
}
