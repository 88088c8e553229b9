use std::sync::Arc;
use std::time::Duration;

use rvib_core::{Error, Result, SecretStore};
use tokio::time::Instant;
use url::Url;

use crate::codec::BuildRequestCodec;
use crate::dto::{BuildStatus, RemoteBuildRequest};
use crate::registry::JobRegistry;

/// Status codes the client retries at the request layer. `507` is
/// deliberately excluded: it is handled by `submit`'s endpoint advance,
/// never retried against the same endpoint.
const RETRIABLE_STATUS_CODES: [u16; 7] = [408, 429, 500, 502, 503, 504, 509];

fn is_retriable_status(status: u16) -> bool {
    RETRIABLE_STATUS_CODES.contains(&status)
}

/// Whether a failed `.send()` is a transient network condition worth
/// retrying (I/O interruption, unknown host, connect failure, connection
/// closed, no route to host, TLS handshake failure) rather than something
/// that will fail the same way on every attempt.
fn is_transient_send_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Bounded-attempt, fixed-delay retry parameters applied to every HTTP
/// call `BuildClient` makes.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Three attempts, half a second apart.
    pub const DEFAULT: Self = Self {
        max_attempts: 3,
        base_delay: Duration::from_millis(500),
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// HTTP client for the remote build service: submits builds, polls
/// status, round-robins endpoints on admission rejection, and attaches
/// Basic auth from a [`SecretStore`].
pub struct BuildClient {
    http: reqwest::Client,
    endpoints: Vec<Url>,
    registry: Arc<JobRegistry>,
    secrets: Arc<SecretStore>,
    retry_policy: RetryPolicy,
    request_timeout: Duration,
}

impl BuildClient {
    /// Builds a client over `endpoints`, tried in list order on
    /// admission rejection. `request_timeout` bounds each individual
    /// HTTP call, independent of the build-await wall-clock timeout.
    pub fn new(
        endpoints: Vec<Url>,
        registry: Arc<JobRegistry>,
        secrets: Arc<SecretStore>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            registry,
            secrets,
            retry_policy: RetryPolicy::DEFAULT,
            request_timeout,
        }
    }

    /// Overrides the default retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Submits `request` to the first endpoint that does not respond
    /// 507, recording the winning endpoint in the job registry.
    pub async fn submit(&self, request: &RemoteBuildRequest) -> Result<String> {
        if self.endpoints.is_empty() {
            return Err(Error::ConfigMissing(
                "remote_build.endpoints is empty".to_string(),
            ));
        }

        let body = BuildRequestCodec::encode(request)?;

        for endpoint in &self.endpoints {
            let url = endpoint
                .join("_build")
                .map_err(|e| Error::ProgrammingError(e.to_string()))?;

            let (status, response_body) = self
                .execute_with_retry(|| {
                    self.http
                        .post(url.clone())
                        .header(reqwest::header::CONTENT_TYPE, "application/json")
                        .body(body.clone())
                })
                .await
                .map_err(Error::SubmitHttpError)?;

            match status {
                200 => {
                    let job_id = BuildRequestCodec::decode_submit_response(&response_body)?;
                    self.registry.insert(job_id.clone(), endpoint.clone());
                    return Ok(job_id);
                }
                507 => continue,
                other => {
                    return Err(Error::SubmitHttpError(format!(
                        "http {other}: {response_body}"
                    )));
                }
            }
        }

        Err(Error::SubmitRejectedAllEndpoints)
    }

    /// Queries the current status of `job_id`, against the endpoint it
    /// was submitted to.
    pub async fn status(&self, job_id: &str) -> Result<BuildStatus> {
        let endpoint = self.registry.endpoint_for(job_id).ok_or_else(|| {
            Error::ProgrammingError(format!("status query for unregistered job_id {job_id}"))
        })?;
        let url = endpoint
            .join(&format!("_status/{job_id}"))
            .map_err(|e| Error::ProgrammingError(e.to_string()))?;

        let (status, body) = self
            .execute_with_retry(|| self.http.get(url.clone()))
            .await
            .map_err(Error::StatusHttpError)?;

        if status != 200 {
            return Err(Error::StatusHttpError(format!("http {status}: {body}")));
        }

        BuildRequestCodec::decode_status(&body)
    }

    /// Polls `job_id` until it reaches a terminal state or `timeout`
    /// elapses, sleeping `poll_interval` between polls and `initial_delay`
    /// before the first one.
    pub async fn await_build(
        &self,
        job_id: &str,
        timeout: Duration,
        poll_interval: Duration,
        initial_delay: Duration,
    ) -> Result<String> {
        let deadline = Instant::now() + timeout;

        if !initial_delay.is_zero() {
            tokio::time::sleep(initial_delay).await;
        }

        loop {
            if Instant::now() >= deadline {
                return Err(Error::BuildTimedOut);
            }

            match self.status(job_id).await? {
                BuildStatus::Completed { index_path } => {
                    self.registry.remove(job_id);
                    return Ok(index_path);
                }
                BuildStatus::Failed { error } => {
                    self.registry.remove(job_id);
                    return Err(Error::BuildReportedFailed(error));
                }
                BuildStatus::Running => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(Error::BuildTimedOut);
                    }
                    tokio::time::sleep(poll_interval.min(remaining)).await;
                }
            }
        }
    }

    async fn execute_with_retry(
        &self,
        build_request: impl Fn() -> reqwest::RequestBuilder,
    ) -> std::result::Result<(u16, String), String> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let mut request = build_request().timeout(self.request_timeout);
            if let Some(auth) = self.secrets.authorization_header().await {
                request = request.header(reqwest::header::AUTHORIZATION, auth);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    if is_retriable_status(status) && attempt < self.retry_policy.max_attempts {
                        tokio::time::sleep(self.retry_policy.base_delay).await;
                        continue;
                    }
                    return Ok((status, body));
                }
                Err(err) => {
                    if is_transient_send_error(&err) && attempt < self.retry_policy.max_attempts {
                        tokio::time::sleep(self.retry_policy.base_delay).await;
                        continue;
                    }
                    return Err(err.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvib_core::{Credentials, DataType, IndexParameters, SecretStore};

    #[tokio::test]
    async fn connect_failure_is_treated_as_transient() {
        let http = reqwest::Client::new();
        let err = http.get("http://127.0.0.1:1").send().await.unwrap_err();
        assert!(is_transient_send_error(&err));
    }

    #[test]
    fn retriable_status_codes_match_the_documented_set() {
        for code in [408, 429, 500, 502, 503, 504, 509] {
            assert!(is_retriable_status(code), "{code} should be retriable");
        }
        for code in [400, 401, 403, 404, 501, 507] {
            assert!(!is_retriable_status(code), "{code} should not be retriable");
        }
    }

    fn sample_request() -> RemoteBuildRequest {
        RemoteBuildRequest::new(
            "s3",
            "bucket",
            "prefix/base.knnvec",
            "prefix/base.knndid",
            "cluster-1",
            768,
            1_000_000,
            DataType::F32,
            "faiss",
            IndexParameters {
                space_type: "l2".into(),
                algorithm: "hnsw".into(),
                algorithm_parameters: serde_json::json!({}),
            },
        )
    }

    fn client_for(endpoints: Vec<Url>, secrets: Arc<SecretStore>) -> BuildClient {
        BuildClient::new(
            endpoints,
            Arc::new(JobRegistry::new()),
            secrets,
            Duration::from_secs(5),
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
        })
    }

    #[tokio::test]
    async fn admission_walk_advances_past_507_endpoints() {
        let mut e1 = mockito::Server::new_async().await;
        let mut e2 = mockito::Server::new_async().await;
        let mut e3 = mockito::Server::new_async().await;

        let m1 = e1.mock("POST", "/_build").with_status(507).create_async().await;
        let m2 = e2.mock("POST", "/_build").with_status(507).create_async().await;
        let m3 = e3
            .mock("POST", "/_build")
            .with_status(200)
            .with_body(r#"{"job_id":"job-3"}"#)
            .create_async()
            .await;

        let endpoints = vec![
            Url::parse(&format!("{}/", e1.url())).unwrap(),
            Url::parse(&format!("{}/", e2.url())).unwrap(),
            Url::parse(&format!("{}/", e3.url())).unwrap(),
        ];
        let client = client_for(endpoints.clone(), Arc::new(SecretStore::empty()));

        let job_id = client.submit(&sample_request()).await.unwrap();
        assert_eq!(job_id, "job-3");
        assert_eq!(client.registry.endpoint_for("job-3"), Some(endpoints[2].clone()));

        m1.assert_async().await;
        m2.assert_async().await;
        m3.assert_async().await;
    }

    #[tokio::test]
    async fn all_endpoints_rejecting_fails_with_all_endpoints_rejected() {
        let mut e1 = mockito::Server::new_async().await;
        let mut e2 = mockito::Server::new_async().await;
        e1.mock("POST", "/_build").with_status(507).create_async().await;
        e2.mock("POST", "/_build").with_status(507).create_async().await;

        let endpoints = vec![
            Url::parse(&format!("{}/", e1.url())).unwrap(),
            Url::parse(&format!("{}/", e2.url())).unwrap(),
        ];
        let client = client_for(endpoints, Arc::new(SecretStore::empty()));

        let err = client.submit(&sample_request()).await.unwrap_err();
        assert!(matches!(err, Error::SubmitRejectedAllEndpoints));
    }

    #[tokio::test]
    async fn retries_retriable_status_then_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/_build")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;
        let m_ok = server
            .mock("POST", "/_build")
            .with_status(200)
            .with_body(r#"{"job_id":"job-1"}"#)
            .expect(1)
            .create_async()
            .await;

        let endpoints = vec![Url::parse(&format!("{}/", server.url())).unwrap()];
        let client = client_for(endpoints, Arc::new(SecretStore::empty()));

        let job_id = client.submit(&sample_request()).await.unwrap();
        assert_eq!(job_id, "job-1");
        m.assert_async().await;
        m_ok.assert_async().await;
    }

    #[tokio::test]
    async fn non_retriable_status_fails_immediately() {
        let mut server = mockito::Server::new_async().await;
        let m = server.mock("POST", "/_build").with_status(404).expect(1).create_async().await;

        let endpoints = vec![Url::parse(&format!("{}/", server.url())).unwrap()];
        let client = client_for(endpoints, Arc::new(SecretStore::empty()));

        let err = client.submit(&sample_request()).await.unwrap_err();
        assert!(matches!(err, Error::SubmitHttpError(_)));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn credentials_attach_basic_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/_build")
            .match_header("authorization", "Basic ZGVtbzpkZW1v")
            .with_status(200)
            .with_body(r#"{"job_id":"job-1"}"#)
            .create_async()
            .await;

        let endpoints = vec![Url::parse(&format!("{}/", server.url())).unwrap()];
        let secrets = Arc::new(SecretStore::with_credentials(Credentials::new("demo", "demo")));
        let client = client_for(endpoints, secrets);

        client.submit(&sample_request()).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn no_credentials_sends_no_authorization_header() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/_build")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"job_id":"job-1"}"#)
            .create_async()
            .await;

        let endpoints = vec![Url::parse(&format!("{}/", server.url())).unwrap()];
        let client = client_for(endpoints, Arc::new(SecretStore::empty()));

        client.submit(&sample_request()).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn status_query_targets_the_endpoint_the_job_was_submitted_to() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/_build")
            .with_status(200)
            .with_body(r#"{"job_id":"job-1"}"#)
            .create_async()
            .await;
        let status_mock = server
            .mock("GET", "/_status/job-1")
            .with_status(200)
            .with_body(r#"{"task_status":"COMPLETED_INDEX_BUILD","index_path":"out.faiss","error":null}"#)
            .create_async()
            .await;

        let endpoints = vec![Url::parse(&format!("{}/", server.url())).unwrap()];
        let client = client_for(endpoints, Arc::new(SecretStore::empty()));

        let job_id = client.submit(&sample_request()).await.unwrap();
        let status = client.status(&job_id).await.unwrap();
        assert_eq!(
            status,
            BuildStatus::Completed {
                index_path: "out.faiss".to_string()
            }
        );
        status_mock.assert_async().await;
    }

    #[tokio::test]
    async fn await_build_returns_index_path_on_completion_and_clears_registry() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/_build")
            .with_status(200)
            .with_body(r#"{"job_id":"job-1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/_status/job-1")
            .with_status(200)
            .with_body(r#"{"task_status":"RUNNING_INDEX_BUILD","index_path":null,"error":null}"#)
            .expect(2)
            .create_async()
            .await;
        server
            .mock("GET", "/_status/job-1")
            .with_status(200)
            .with_body(r#"{"task_status":"COMPLETED_INDEX_BUILD","index_path":"out.faiss","error":null}"#)
            .create_async()
            .await;

        let endpoints = vec![Url::parse(&format!("{}/", server.url())).unwrap()];
        let client = client_for(endpoints, Arc::new(SecretStore::empty()));

        let job_id = client.submit(&sample_request()).await.unwrap();
        let index_path = client
            .await_build(&job_id, Duration::from_secs(5), Duration::from_millis(5), Duration::from_millis(0))
            .await
            .unwrap();
        assert_eq!(index_path, "out.faiss");
        assert!(client.registry.endpoint_for(&job_id).is_none());
    }

    #[tokio::test]
    async fn await_build_times_out_while_remote_job_keeps_running() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/_build")
            .with_status(200)
            .with_body(r#"{"job_id":"job-1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/_status/job-1")
            .with_status(200)
            .with_body(r#"{"task_status":"RUNNING_INDEX_BUILD","index_path":null,"error":null}"#)
            .create_async()
            .await;

        let endpoints = vec![Url::parse(&format!("{}/", server.url())).unwrap()];
        let client = client_for(endpoints, Arc::new(SecretStore::empty()));

        let job_id = client.submit(&sample_request()).await.unwrap();
        let err = client
            .await_build(&job_id, Duration::from_millis(50), Duration::from_millis(20), Duration::from_millis(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BuildTimedOut));
    }
}
