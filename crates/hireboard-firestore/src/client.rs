//! Firestore REST API client.
//!
//! - Token caching with refresh margin and one forced refresh on expiry
//! - Pooled HTTP client with timeouts
//! - Tracing span and metrics around every request
//! - Emulator support via `FIRESTORE_EMULATOR_HOST`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::{record_query_documents, record_request};
use crate::retry::RetryConfig;
use crate::token_cache::TokenCache;
use crate::types::{Document, RunQueryRequest, RunQueryResponse, StructuredQuery, Value};

/// Bearer token the Firestore emulator accepts as an admin caller.
const EMULATOR_TOKEN: &str = "owner";

// =============================================================================
// Configuration
// =============================================================================

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// `host:port` of a local emulator; disables service-account auth.
    pub emulator_host: Option<String>,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                FirestoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                )
            })?;

        if project_id.is_empty() {
            return Err(FirestoreError::auth_error(
                "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
            ));
        }

        let connect_timeout_secs: u64 = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
            emulator_host: std::env::var("FIRESTORE_EMULATOR_HOST")
                .ok()
                .filter(|h| !h.is_empty()),
        })
    }

    /// Root URL for document operations.
    pub fn base_url(&self) -> String {
        let origin = match &self.emulator_host {
            Some(host) => format!("http://{}", host),
            None => "https://firestore.googleapis.com".to_string(),
        };
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            origin, self.project_id, self.database_id
        )
    }
}

// =============================================================================
// Client
// =============================================================================

/// Firestore REST API client. Cheap to clone.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    base_url: String,
    token_cache: Arc<TokenCache>,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub async fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let token_cache = match &config.emulator_host {
            Some(_) => TokenCache::fixed(EMULATOR_TOKEN),
            None => TokenCache::new(Self::create_auth_provider()?),
        };
        Self::with_token_cache(config, token_cache)
    }

    /// Create a client with an explicit token source.
    pub fn with_token_cache(config: FirestoreConfig, token_cache: TokenCache) -> FirestoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("hireboard-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let base_url = config.base_url();

        Ok(Self {
            http,
            config,
            base_url,
            token_cache: Arc::new(token_cache),
        })
    }

    fn create_auth_provider() -> FirestoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            FirestoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(FirestoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    /// Create from environment variables.
    pub async fn from_env() -> FirestoreResult<Self> {
        let config = FirestoreConfig::from_env()?;
        Self::new(config).await
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    fn document_path(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    /// Send a request, refreshing the token once if Firestore reports it expired.
    async fn send<F>(&self, build: F) -> FirestoreResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.token_cache.get_token().await?;
        let response = build(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&body) {
            return Err(FirestoreError::from_http_status(401, body));
        }

        debug!("Firestore access token expired, refreshing");
        self.token_cache.invalidate().await;
        let token = self.token_cache.get_token().await?;
        Ok(build(&token).send().await?)
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Get a document. `None` if it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let url = self.document_path(collection, doc_id);

        self.execute_request("get_document", collection, Some(doc_id), async {
            let response = self.send(|token| self.http.get(&url).bearer_auth(token)).await?;

            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Create a document with a caller-chosen ID.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let url = format!(
            "{}/{}?documentId={}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        );
        let body = Document::new(fields);

        self.execute_request("create_document", collection, Some(doc_id), async {
            let response = self
                .send(|token| self.http.post(&url).bearer_auth(token).json(&body))
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
                StatusCode::CONFLICT => Err(FirestoreError::AlreadyExists(format!(
                    "{}/{}",
                    collection, doc_id
                ))),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Overwrite the masked fields of an existing document.
    ///
    /// Fails with `NotFound` instead of creating the document.
    pub async fn update_existing_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: &[&str],
    ) -> FirestoreResult<Document> {
        let mut params: Vec<String> = update_mask
            .iter()
            .map(|f| format!("updateMask.fieldPaths={}", urlencoding::encode(f)))
            .collect();
        params.push("currentDocument.exists=true".to_string());
        let url = format!("{}?{}", self.document_path(collection, doc_id), params.join("&"));
        let body = Document::new(fields);

        self.execute_request("update_document", collection, Some(doc_id), async {
            let response = self
                .send(|token| self.http.patch(&url).bearer_auth(token).json(&body))
                .await?;

            match response.status() {
                StatusCode::OK => Ok(response.json().await?),
                StatusCode::NOT_FOUND => Err(FirestoreError::not_found(format!(
                    "{}/{}",
                    collection, doc_id
                ))),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Delete a document. Deleting a missing document succeeds.
    pub async fn delete_document(&self, collection: &str, doc_id: &str) -> FirestoreResult<()> {
        let url = self.document_path(collection, doc_id);

        self.execute_request("delete_document", collection, Some(doc_id), async {
            let response = self.send(|token| self.http.delete(&url).bearer_auth(token)).await?;

            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
                StatusCode::NOT_FOUND => {
                    debug!("Document {}/{} already deleted", collection, doc_id);
                    Ok(())
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Query Operations
    // =========================================================================

    /// Run a structured query over a top-level collection.
    pub async fn run_query(&self, query: StructuredQuery) -> FirestoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.base_url);
        let collection = query
            .from
            .first()
            .map(|c| c.collection_id.clone())
            .unwrap_or_default();
        let request = RunQueryRequest {
            structured_query: query,
        };

        self.execute_request("run_query", &collection, None, async {
            let response = self
                .send(|token| self.http.post(&url).bearer_auth(token).json(&request))
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await.unwrap_or_default();
                    // runQuery streams a JSON array; entries without a document carry only readTime.
                    let responses: Vec<RunQueryResponse> =
                        serde_json::from_str(&body).map_err(|e| {
                            FirestoreError::invalid_response(format!(
                                "Failed to parse runQuery response: {} (body prefix: {})",
                                e,
                                body.chars().take(200).collect::<String>()
                            ))
                        })?;

                    let docs: Vec<Document> =
                        responses.into_iter().filter_map(|r| r.document).collect();
                    record_query_documents(&collection, docs.len());
                    Ok(docs)
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Execute with the configured retry policy.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> FirestoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = FirestoreResult<T>>,
    {
        crate::retry::with_retry(&self.config.retry, operation, op).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        doc_id: Option<&str>,
        fut: F,
    ) -> FirestoreResult<T>
    where
        F: std::future::Future<Output = FirestoreResult<T>>,
    {
        let span = match doc_id {
            Some(id) => info_span!("firestore_request", operation = %operation, collection = %collection, doc_id = %id),
            None => info_span!("firestore_request", operation = %operation, collection = %collection),
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> FirestoreError {
        let body = response.text().await.unwrap_or_default();
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
