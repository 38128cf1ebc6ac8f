//! HTTP client for the Atlas Admin API v2
//!
//! Requests are authenticated with HTTP digest auth: each request is sent once without
//! credentials, and when Atlas answers `401` with a `WWW-Authenticate: Digest` challenge
//! the request is repeated with the computed `Authorization` header.

use super::models::{ClusterState, FlexCluster, Paginated, StandardCluster};
use super::{ApiResult, ControlPlane};
use crate::config::variables::{ATLAS_API_PRIVATE_KEY, ATLAS_API_PUBLIC_KEY, ATLAS_PROJECT_ID};
use crate::config::{secret_from, AtlasSettings, EnvStore, SecretString};
use crate::core::shutdown::wait_for_shutdown;
use crate::domain::{
    AtlasApiError, ClusterDescriptor, ConnectionSpec, OrderflowError, ProcessorSpec, Result,
    StreamInstanceSpec,
};
use crate::log_atlas_call;
use async_trait::async_trait;
use digest_auth::{AuthContext, HttpMethod};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Client, ClientBuilder, Method, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Atlas programmatic API key pair plus the project it is scoped to
#[derive(Debug, Clone)]
pub struct AtlasCredentials {
    pub public_key: String,
    pub private_key: SecretString,
    pub project_id: String,
}

impl AtlasCredentials {
    /// Read the key pair and project id from the env store
    pub fn from_store(store: &EnvStore) -> Result<Self> {
        Ok(Self {
            public_key: store.require(ATLAS_API_PUBLIC_KEY)?.to_string(),
            private_key: secret_from(store.require(ATLAS_API_PRIVATE_KEY)?),
            project_id: store.require(ATLAS_PROJECT_ID)?.to_string(),
        })
    }
}

/// Status and raw body of an Atlas response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Turn a non-2xx response into a typed error carrying the raw body
    fn into_success(self) -> ApiResult<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        let status = self.status.as_u16();
        if self.status == StatusCode::UNAUTHORIZED || self.status == StatusCode::FORBIDDEN {
            return Err(AtlasApiError::Unauthorized {
                status,
                body: self.body,
            });
        }
        Err(AtlasApiError::Status {
            status,
            body: self.body,
        })
    }

    fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| AtlasApiError::InvalidResponse(format!("{e}: {}", self.body)))
    }
}

/// Which versioned media type a call uses
#[derive(Debug, Clone, Copy)]
enum ApiFamily {
    Clusters,
    Streams,
}

/// Atlas Admin API client
pub struct AtlasClient {
    client: Client,
    settings: AtlasSettings,
    credentials: AtlasCredentials,
    shutdown: watch::Receiver<bool>,
}

impl AtlasClient {
    /// Create a client for one project
    pub fn new(
        settings: &AtlasSettings,
        credentials: AtlasCredentials,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(settings.request_timeout())
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                OrderflowError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            settings: settings.clone(),
            credentials,
            shutdown,
        })
    }

    /// Create a client from the credentials in the env store
    pub fn from_store(
        settings: &AtlasSettings,
        store: &EnvStore,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        Self::new(settings, AtlasCredentials::from_store(store)?, shutdown)
    }

    fn project_url(&self, path: &str) -> ApiResult<Url> {
        let raw = format!(
            "{}/groups/{}{}",
            self.settings.base_url.trim_end_matches('/'),
            self.credentials.project_id,
            path
        );
        Url::parse(&raw).map_err(|e| AtlasApiError::Transport(format!("Invalid URL {raw}: {e}")))
    }

    fn accept(&self, family: ApiFamily) -> String {
        match family {
            ApiFamily::Clusters => self.settings.clusters_accept(),
            ApiFamily::Streams => self.settings.streams_accept(),
        }
    }

    /// Send one request, answering a digest challenge if Atlas issues one
    async fn send(
        &self,
        method: Method,
        path: &str,
        family: ApiFamily,
        body: Option<&Value>,
    ) -> ApiResult<ApiResponse> {
        let url = self.project_url(path)?;
        let payload = body.map(serde_json::to_vec).transpose().map_err(|e| {
            AtlasApiError::InvalidResponse(format!("Failed to serialize request body: {e}"))
        })?;

        let mut response = self
            .dispatch(method.clone(), url.clone(), family, payload.as_deref(), None)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if let Some(challenge) = challenge.filter(|c| c.starts_with("Digest")) {
                let authorization =
                    self.digest_authorization(&challenge, &method, &url, payload.as_deref())?;
                response = self
                    .dispatch(
                        method.clone(),
                        url.clone(),
                        family,
                        payload.as_deref(),
                        Some(authorization),
                    )
                    .await?;
            }
        }

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        log_atlas_call!(method, url.path(), status.as_u16());

        Ok(ApiResponse { status, body: text })
    }

    async fn dispatch(
        &self,
        method: Method,
        url: Url,
        family: ApiFamily,
        payload: Option<&[u8]>,
        authorization: Option<String>,
    ) -> ApiResult<reqwest::Response> {
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, self.accept(family))
            .header(CONTENT_TYPE, "application/json");

        if let Some(payload) = payload {
            request = request.body(payload.to_vec());
        }
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        request.send().await.map_err(transport_error)
    }

    fn digest_authorization(
        &self,
        challenge: &str,
        method: &Method,
        url: &Url,
        payload: Option<&[u8]>,
    ) -> ApiResult<String> {
        let mut prompt =
            digest_auth::parse(challenge).map_err(|e| AtlasApiError::DigestAuth(e.to_string()))?;

        let uri = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let digest_method = if *method == Method::POST {
            HttpMethod::POST
        } else {
            HttpMethod::GET
        };

        let context = AuthContext::new_with_method(
            self.credentials.public_key.as_str(),
            self.credentials.private_key.expose_secret().as_str(),
            uri.as_str(),
            payload,
            digest_method,
        );

        let answer = prompt
            .respond(&context)
            .map_err(|e| AtlasApiError::DigestAuth(e.to_string()))?;
        Ok(answer.to_header_string())
    }

    async fn get(&self, path: &str, family: ApiFamily) -> ApiResult<ApiResponse> {
        self.send(Method::GET, path, family, None).await
    }

    async fn post(&self, path: &str, family: ApiFamily, body: &Value) -> ApiResult<ApiResponse> {
        self.send(Method::POST, path, family, Some(body)).await
    }

    fn cluster_request(&self, name: &str) -> Value {
        json!({
            "name": name,
            "clusterType": "REPLICASET",
            "replicationSpecs": [{
                "regionConfigs": [{
                    "electableSpecs": { "instanceSize": "M0" },
                    "backingProviderName": "AWS",
                    "priority": 7,
                    "providerName": "TENANT",
                    "regionName": "US_EAST_1",
                }]
            }],
            "terminationProtectionEnabled": false,
        })
    }

    async fn cluster_state(&self, name: &str) -> Result<bool> {
        let response = self
            .get(&format!("/clusters/{name}"), ApiFamily::Clusters)
            .await?
            .into_success()?;
        let state: ClusterState = response.json()?;
        tracing::debug!(cluster = %name, state = ?state.state_name, "Polled cluster state");
        Ok(state.state_name.as_deref() == Some("IDLE"))
    }

    async fn list_family<T, F>(&self, path: &str, convert: F) -> Result<Vec<ClusterDescriptor>>
    where
        T: DeserializeOwned,
        F: Fn(T) -> ClusterDescriptor,
    {
        let response = self.get(path, ApiFamily::Clusters).await?;
        match response.into_success() {
            Ok(response) => {
                let page: Paginated<T> = response.json()?;
                Ok(page.results.into_iter().map(convert).collect())
            }
            Err(err @ AtlasApiError::Unauthorized { .. }) => Err(err.into()),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "Cluster listing failed, skipping");
                Ok(Vec::new())
            }
        }
    }
}

/// Poll `probe` every `interval` until it reports ready, `timeout` elapses or shutdown
/// is requested
///
/// Returns the time waited when ready, `None` on timeout and
/// [`OrderflowError::Interrupted`] on shutdown.
pub async fn poll_until_ready<F, Fut>(
    interval: Duration,
    timeout: Duration,
    shutdown: &watch::Receiver<bool>,
    mut probe: F,
) -> Result<Option<Duration>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut shutdown = shutdown.clone();
    let started = Instant::now();

    loop {
        if probe().await? {
            return Ok(Some(started.elapsed()));
        }

        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }

        let wait = interval.min(timeout - elapsed);
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = wait_for_shutdown(&mut shutdown) => return Err(OrderflowError::Interrupted),
        }
    }
}

fn transport_error(e: reqwest::Error) -> AtlasApiError {
    if e.is_timeout() {
        AtlasApiError::RequestTimeout(e.to_string())
    } else {
        AtlasApiError::Transport(e.to_string())
    }
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

#[async_trait]
impl ControlPlane for AtlasClient {
    async fn create_cluster(&self, name: &str) -> Result<()> {
        tracing::info!(cluster = %name, "Creating Atlas cluster");

        self.post("/clusters", ApiFamily::Clusters, &self.cluster_request(name))
            .await?
            .into_success()?;

        let timeout = self.settings.cluster_ready_timeout();
        let bar = spinner(format!("Waiting for cluster '{name}' to become ready"));
        let outcome = poll_until_ready(
            self.settings.cluster_poll_interval(),
            timeout,
            &self.shutdown,
            || self.cluster_state(name),
        )
        .await;
        bar.finish_and_clear();

        match outcome? {
            Some(waited) => {
                tracing::info!(cluster = %name, waited_secs = waited.as_secs(), "Cluster ready");
                Ok(())
            }
            None => Err(AtlasApiError::ClusterNotReady {
                cluster: name.to_string(),
                waited: timeout,
            }
            .into()),
        }
    }

    async fn cluster_connection_info(&self, name: &str) -> Result<ClusterDescriptor> {
        let flex = self
            .get(&format!("/flexClusters/{name}"), ApiFamily::Clusters)
            .await?;

        if flex.status == StatusCode::BAD_REQUEST || flex.status == StatusCode::NOT_FOUND {
            tracing::debug!(
                cluster = %name,
                status = flex.status.as_u16(),
                "Not a flex cluster, using the standard endpoint"
            );
        } else {
            let descriptor = flex.into_success()?.json::<FlexCluster>()?.into_descriptor();
            if descriptor.connection_string.is_some() {
                return Ok(descriptor);
            }
            tracing::debug!(cluster = %name, "Flex cluster has no connection string yet");
        }

        let standard = self
            .get(&format!("/clusters/{name}"), ApiFamily::Clusters)
            .await?
            .into_success()?;
        Ok(standard.json::<StandardCluster>()?.into_descriptor())
    }

    async fn list_clusters(&self) -> Result<Vec<ClusterDescriptor>> {
        let mut clusters = self
            .list_family("/flexClusters", FlexCluster::into_descriptor)
            .await?;
        clusters.extend(
            self.list_family("/clusters", StandardCluster::into_descriptor)
                .await?,
        );
        Ok(clusters)
    }

    async fn create_stream_instance(&self, spec: &StreamInstanceSpec) -> ApiResult<()> {
        self.post("/streams", ApiFamily::Streams, &spec.to_payload())
            .await?
            .into_success()
            .map(|_| ())
    }

    async fn create_connection(&self, instance: &str, spec: &ConnectionSpec) -> ApiResult<()> {
        self.post(
            &format!("/streams/{instance}/connections"),
            ApiFamily::Streams,
            &spec.to_payload(),
        )
        .await?
        .into_success()
        .map(|_| ())
    }

    async fn create_processor(&self, instance: &str, spec: &ProcessorSpec) -> ApiResult<()> {
        self.post(
            &format!("/streams/{instance}/processor"),
            ApiFamily::Streams,
            &spec.to_payload(),
        )
        .await?
        .into_success()
        .map(|_| ())
    }

    async fn start_processor(&self, instance: &str, name: &str) -> ApiResult<()> {
        self.post(
            &format!("/streams/{instance}/processor/{name}:start"),
            ApiFamily::Streams,
            &json!({}),
        )
        .await?
        .into_success()
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_into_success_classifies_statuses() {
        let ok = ApiResponse {
            status: StatusCode::CREATED,
            body: "{}".to_string(),
        };
        assert!(ok.into_success().is_ok());

        let forbidden = ApiResponse {
            status: StatusCode::FORBIDDEN,
            body: "nope".to_string(),
        };
        assert!(matches!(
            forbidden.into_success(),
            Err(AtlasApiError::Unauthorized { status: 403, .. })
        ));

        let conflict = ApiResponse {
            status: StatusCode::CONFLICT,
            body: "{\"errorCode\":\"X\"}".to_string(),
        };
        match conflict.into_success() {
            Err(AtlasApiError::Status { status, body }) => {
                assert_eq!(status, 409);
                assert!(body.contains("errorCode"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_until_ready_returns_when_probe_succeeds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let shutdown = crate::core::shutdown::never();
        let counter = calls.clone();
        let outcome = poll_until_ready(
            Duration::from_millis(10),
            Duration::from_secs(5),
            &shutdown,
            move || {
                let counter = counter.clone();
                async move { Ok(counter.fetch_add(1, Ordering::SeqCst) >= 2) }
            },
        )
        .await
        .unwrap();
        assert!(outcome.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_until_ready_times_out() {
        let shutdown = crate::core::shutdown::never();
        let outcome = poll_until_ready(
            Duration::from_millis(20),
            Duration::from_millis(100),
            &shutdown,
            || async { Ok(false) },
        )
        .await
        .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_poll_until_ready_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let err = poll_until_ready(
            Duration::from_secs(10),
            Duration::from_secs(60),
            &rx,
            || async { Ok(false) },
        )
        .await
        .unwrap_err();
        assert!(err.is_interrupted());
    }

    #[tokio::test]
    async fn test_poll_until_ready_propagates_probe_errors() {
        let shutdown = crate::core::shutdown::never();
        let err = poll_until_ready(
            Duration::from_millis(10),
            Duration::from_secs(1),
            &shutdown,
            || async { Err(OrderflowError::Other("probe failed".to_string())) },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("probe failed"));
    }
}
