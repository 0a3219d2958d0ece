//! Retrying HTTP client.
//!
//! Status codes are never retried here; the Octobox API uses 423/503 to say
//! a sync job is running, which callers must see. Only transport failures
//! are retried, and only for requests sent through [`HttpClient::send`].

use std::time::Duration;

use octotriage_domain::{Result, TriageError};
use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::conversions::to_domain;

/// HTTP client with timeout and connection-level retry.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send an idempotent request, retrying transport failures up to the
    /// configured attempt budget.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let attempts = self.max_attempts.max(1);

        for attempt in 1..=attempts {
            let cloned = builder.try_clone().ok_or_else(|| {
                TriageError::Internal("streaming request bodies cannot be retried".into())
            })?;

            match self.execute(cloned, attempt).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < attempts && should_retry_error(&err) => {
                    self.sleep_with_backoff(attempt).await;
                }
                Err(err) => return Err(to_domain(err)),
            }
        }

        Err(TriageError::Internal("http client exhausted retries without a result".into()))
    }

    /// Send a request exactly once. Used for mutations.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Response> {
        self.execute(builder, 1).await.map_err(to_domain)
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        attempt: usize,
    ) -> std::result::Result<Response, reqwest::Error> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(attempt, %method, path = url.path(), "http.request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(attempt, %method, path = url.path(), status = %response.status(), "http.response");
                Ok(response)
            }
            Err(err) => {
                debug!(attempt, %method, path = url.path(), error = %err, "http.failure");
                Err(err)
            }
        }
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = u32::try_from(retry_number.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    system_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 2,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            default_headers: None,
            system_proxy: true,
        }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts for [`HttpClient::send`] (initial try plus
    /// retries).
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub const fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Ignore `HTTP(S)_PROXY` from the environment. Local test servers only.
    #[must_use]
    pub const fn no_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);
        if !self.system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(to_domain)?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::StatusCode;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> HttpClient {
        HttpClient::builder()
            .timeout(Duration::from_secs(2))
            .base_backoff(Duration::from_millis(5))
            .no_proxy()
            .build()
            .expect("http client")
    }

    #[test]
    fn system_proxy_is_honoured_unless_disabled() {
        assert!(HttpClientBuilder::default().system_proxy);
        assert!(!HttpClient::builder().no_proxy().system_proxy);
    }

    #[tokio::test]
    async fn server_errors_are_returned_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client();
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn connection_failures_surface_as_network_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = client();
        let err = client
            .send(client.request(Method::GET, format!("http://{addr}/")))
            .await
            .expect_err("connection refused");

        assert!(matches!(err, TriageError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn send_once_makes_a_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client();
        let response =
            client.send_once(client.request(Method::POST, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn backoff_doubles_per_retry() {
        let client = client();
        assert_eq!(client.backoff_delay(1), Duration::from_millis(5));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(20));
    }
}
