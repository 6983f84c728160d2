//! Datastore REST client
//!
//! Talks to the datastore's JSON API:
//! - `GET  /health` - readiness probe
//! - `GET  /api/v1/{kind}?{selector}` - list, returns `{"items": [...]}`
//! - `POST /api/v1/{kind}` - create, `409 Conflict` if the resource exists
//! - `PUT  /api/v1/{kind}/{id}` - create or replace

use crate::datastore_trait::DatastoreClientTrait;
use crate::error::DatastoreError;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use resources::{ResourceDocument, ResourceKey, ResourceKind, ResourceList, ResourceMetadata};
use std::time::Duration;
use tracing::debug;

/// Datastore API client
#[derive(Debug, Clone)]
pub struct DatastoreClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl DatastoreClient {
    /// Create a new datastore client
    ///
    /// # Arguments
    /// * `base_url` - Datastore base URL (e.g., "http://127.0.0.1:8080")
    /// * `token` - Optional bearer token
    pub fn new(base_url: String, token: Option<String>) -> Result<Self, DatastoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn collection_url(&self, kind: ResourceKind) -> String {
        format!("{}/api/v1/{}", self.base_url, kind.api_path())
    }

    fn resource_url(&self, key: &ResourceKey) -> String {
        format!("{}/{}", self.collection_url(key.kind), urlencoding::encode(&key.id))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, DatastoreError> {
        builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                DatastoreError::Unreachable(e.to_string())
            } else {
                DatastoreError::Http(e)
            }
        })
    }

    /// Map a non-success response to a typed error
    async fn error_for_response(response: Response, context: &str) -> DatastoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DatastoreError::Authentication(format!("{}: {} - {}", context, status, body))
            }
            StatusCode::NOT_FOUND => DatastoreError::NotFound(context.to_string()),
            StatusCode::CONFLICT => DatastoreError::AlreadyExists(context.to_string()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                DatastoreError::InvalidRequest(format!("{}: {}", context, body))
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                DatastoreError::Unreachable(format!("{}: {}", context, status))
            }
            _ => DatastoreError::Api(format!("{}: {} - {}", context, status, body)),
        }
    }

    async fn parse_document(response: Response) -> Result<ResourceDocument, DatastoreError> {
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait::async_trait]
impl DatastoreClientTrait for DatastoreClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn probe(&self) -> Result<(), DatastoreError> {
        let url = format!("{}/health", self.base_url);
        debug!("Probing datastore at {}", url);

        let response = self.send(self.request(Method::GET, &url)).await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for_response(response, "datastore health check").await)
    }

    async fn list(&self, kind: ResourceKind, selector: &ResourceMetadata) -> Result<Vec<ResourceDocument>, DatastoreError> {
        let mut url = self.collection_url(kind);
        let query: Vec<String> = selector
            .selector_pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        if !query.is_empty() {
            url = format!("{}?{}", url, query.join("&"));
        }
        debug!("Listing {} resources: {}", kind, url);

        let response = self.send(self.request(Method::GET, &url)).await?;
        if !response.status().is_success() {
            return Err(Self::error_for_response(response, &format!("list {}", kind)).await);
        }

        // Keep the body around for a useful error if it does not decode
        let text = response.text().await?;
        let list: ResourceList = serde_json::from_str(&text).map_err(|e| {
            DatastoreError::Api(format!(
                "error decoding {} list: {} - Response (first 500 chars): {}",
                kind,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })?;
        Ok(list.items)
    }

    async fn create(&self, resource: &ResourceDocument) -> Result<ResourceDocument, DatastoreError> {
        let key = resource.key()?;
        let url = self.collection_url(key.kind);
        debug!("Creating {}", key);

        let response = self.send(self.request(Method::POST, &url).json(resource)).await?;
        if !response.status().is_success() {
            return Err(Self::error_for_response(response, &key.to_string()).await);
        }
        Self::parse_document(response).await
    }

    async fn apply(&self, resource: &ResourceDocument) -> Result<ResourceDocument, DatastoreError> {
        let key = resource.key()?;
        let url = self.resource_url(&key);
        debug!("Applying {}", key);

        let response = self.send(self.request(Method::PUT, &url).json(resource)).await?;
        if !response.status().is_success() {
            return Err(Self::error_for_response(response, &key.to_string()).await);
        }
        Self::parse_document(response).await
    }
}
