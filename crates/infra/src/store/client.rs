//! Profile service client for remote document synchronization
//!
//! HTTP implementation of the `ProfileStore` port against the profile
//! service REST API. Documents live under the `users` collection and are
//! addressed by identity id:
//!
//! - `GET /users/{id}` reads a document (`404` means none exists yet)
//! - `PUT /users/{id}` creates the full initial document
//! - `PATCH /users/{id}` applies a partial refresh
//!
//! Every call carries a bearer token resolved through an
//! [`AccessTokenProvider`] and is wrapped in the configured timeout on top of
//! the HTTP client's own retry budget.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use sprout_core::ProfileStore;
use sprout_domain::constants::PROFILE_COLLECTION;
use sprout_domain::{
    ProfileUpdate, Result as DomainResult, SproutError, StoreConfig, UserProfile,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::http::HttpClient;

use super::auth::AccessTokenProvider;
use super::errors::StoreError;

/// Configuration for the profile store client
#[derive(Debug, Clone)]
pub struct ProfileStoreConfig {
    /// Base URL for the profile service (e.g., "https://api.sprout.app/v1")
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
    /// Max attempts for transient failures
    pub max_retries: usize,
}

impl Default for ProfileStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sprout.app/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

impl From<&StoreConfig> for ProfileStoreConfig {
    fn from(config: &StoreConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            max_retries: config.max_retries,
        }
    }
}

/// Profile service client
///
/// Implements the document operations the reconciler issues. The client is
/// stateless apart from its connection pool; all document state lives in the
/// remote store.
pub struct ProfileStoreClient {
    http_client: Arc<HttpClient>,
    config: ProfileStoreConfig,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl ProfileStoreClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(tokens: Arc<dyn AccessTokenProvider>) -> Result<Self, StoreError> {
        Self::with_config(ProfileStoreConfig::default(), tokens)
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_config(
        config: ProfileStoreConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, StoreError> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_retries)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HttpClient: {}", e)))?;

        Ok(Self { http_client: Arc::new(http_client), config, tokens })
    }

    fn document_url(&self, user_id: &str) -> String {
        format!("{}/{}/{}", self.config.base_url, PROFILE_COLLECTION, user_id)
    }

    /// Build a request with the bearer token attached
    async fn authorized(&self, method: Method, url: &str) -> Result<RequestBuilder, StoreError> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token)))
    }

    /// Send a request and map transport-level statuses to store errors.
    ///
    /// `404` is intentionally not mapped here; the read path treats it as
    /// "no document" while the write paths treat it as a client error.
    async fn send_request(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response =
            tokio::time::timeout(self.config.timeout, self.http_client.send(builder))
                .await
                .map_err(|_| StoreError::Timeout(self.config.timeout))?
                .map_err(StoreError::from)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(StoreError::Auth(format!("profile service rejected credentials: {status}")))
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Err(StoreError::RateLimit("profile service rate limit hit".into()))
        } else if status.is_server_error() {
            Err(StoreError::Server(format!("profile service error: {status}")))
        } else {
            Ok(response)
        }
    }

    /// Health check for the profile service
    ///
    /// # Returns
    ///
    /// `true` if the service is reachable and healthy
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}/health", self.config.base_url);

        debug!(url = %url, "performing profile service health check");

        let builder = self.http_client.request(Method::GET, &url);
        let response = self.send_request(builder).await?;

        if response.status().is_success() {
            debug!("profile service is healthy");
            Ok(true)
        } else {
            warn!(status = %response.status(), "profile service returned non-success status");
            Ok(false)
        }
    }
}

#[async_trait]
impl ProfileStore for ProfileStoreClient {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn read_profile(&self, user_id: &str) -> DomainResult<Option<UserProfile>> {
        let url = self.document_url(user_id);
        let builder = self.authorized(Method::GET, &url).await.map_err(SproutError::from)?;

        let response = self.send_request(builder).await.map_err(SproutError::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("no profile document exists yet");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Client(format!(
                "unexpected status reading profile: {}",
                response.status()
            ))
            .into());
        }

        let profile: UserProfile = response
            .json()
            .await
            .map_err(|e| StoreError::Client(format!("Failed to parse profile document: {}", e)))
            .map_err(SproutError::from)?;

        Ok(Some(profile))
    }

    #[instrument(skip(self, profile), fields(user_id = %user_id))]
    async fn create_profile(&self, user_id: &str, profile: &UserProfile) -> DomainResult<()> {
        let url = self.document_url(user_id);
        let idempotency_key = Uuid::new_v4().to_string();

        let builder = self
            .authorized(Method::PUT, &url)
            .await
            .map_err(SproutError::from)?
            .header("X-Idempotency-Key", idempotency_key)
            .json(profile);

        let response = self.send_request(builder).await.map_err(SproutError::from)?;

        match response.status() {
            status if status.is_success() => {
                info!("created profile document");
                Ok(())
            }
            StatusCode::CONFLICT => {
                // Lost a create race; the next trigger re-reads and updates
                Err(StoreError::Client("profile document already exists".into()).into())
            }
            status => {
                Err(StoreError::Client(format!("unexpected status creating profile: {status}"))
                    .into())
            }
        }
    }

    #[instrument(skip(self, update), fields(user_id = %user_id))]
    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> DomainResult<()> {
        let url = self.document_url(user_id);

        let builder = self
            .authorized(Method::PATCH, &url)
            .await
            .map_err(SproutError::from)?
            .json(update);

        let response = self.send_request(builder).await.map_err(SproutError::from)?;

        match response.status() {
            status if status.is_success() => {
                debug!("refreshed profile document");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                Err(StoreError::NotFound(format!("no profile document for {user_id}")).into())
            }
            status => {
                Err(StoreError::Client(format!("unexpected status updating profile: {status}"))
                    .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::auth::StaticTokenProvider;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> ProfileStoreClient {
        let config = ProfileStoreConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        ProfileStoreClient::with_config(config, Arc::new(StaticTokenProvider::new("test-token")))
            .expect("store client")
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        let result = client.health_check().await;
        assert!(result.is_ok());
        assert!(result.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_document_returns_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/u1"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        let result = client.read_profile("u1").await.expect("read should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_read_rejected_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/u1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        let result = client.read_profile("u1").await;
        assert!(matches!(result, Err(sprout_domain::SproutError::Auth(_))));
    }
}
