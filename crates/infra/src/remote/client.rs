//! Octobox API client
//!
//! Implements the `RemoteService` port over the Octobox JSON API. Reads go
//! through [`HttpClient::send`] and retry once on connection failures.
//! Mutations are sent exactly once.

use async_trait::async_trait;
use octotriage_core::RemoteService;
use octotriage_domain::constants::OCTOBOX_API_HEADER;
use octotriage_domain::{
    FetchFilters, NotificationId, NotificationPage, NotificationPageResponse, PinnedSearch,
    PinnedSearchesResponse, RemoteConfig, Result, TriageError, UnreadCountResponse, UserProfile,
    UserProfileResponse,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use super::errors::RemoteError;
use crate::http::HttpClient;

type QueryPairs = Vec<(&'static str, String)>;

/// HTTP client for one Octobox instance.
#[derive(Debug, Clone)]
pub struct OctoboxClient {
    http: HttpClient,
    base_url: String,
    page_size: u32,
}

impl OctoboxClient {
    /// Build a client from the remote section of the configuration.
    ///
    /// # Errors
    /// Returns [`TriageError::Auth`] when no token is configured and
    /// [`TriageError::Config`] when the base url does not parse.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let token = config
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                TriageError::Auth("no Octobox API token configured; run `octotriage token`".into())
            })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|err| TriageError::Config(format!("invalid Octobox url '{base_url}': {err}")))?;

        let http = HttpClient::builder()
            .timeout(config.timeout())
            .max_attempts(2)
            .user_agent(concat!("octotriage/", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers(token)?)
            .build()?;

        info!(base_url = %base_url, "octobox client initialised");

        Ok(Self { http, base_url, page_size: config.page_size.max(1) })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, query: &QueryPairs) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if query.is_empty() {
            builder
        } else {
            builder.query(query)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: QueryPairs) -> Result<T> {
        let response = self.http.send(self.request(Method::GET, path, &query)).await?;
        let response = ensure_success(response, path).await?;
        decode(response, path).await
    }

    /// Send a mutation once and require a 2xx answer.
    async fn mutate(&self, method: Method, path: &str, query: QueryPairs) -> Result<()> {
        let response = self.http.send_once(self.request(method, path, &query)).await?;
        ensure_success(response, path).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteService for OctoboxClient {
    #[instrument(skip(self, filters))]
    async fn fetch_page(&self, page: u32, filters: &FetchFilters) -> Result<NotificationPage> {
        let mut query: QueryPairs =
            vec![("page", page.to_string()), ("per_page", self.page_size.to_string())];
        if let Some(starred) = filters.starred {
            query.push(("starred", starred.to_string()));
        }
        if let Some(archived) = filters.archived {
            query.push(("archive", archived.to_string()));
        }
        if let Some(q) = filters.query.as_deref().filter(|q| !q.is_empty()) {
            query.push(("q", q.to_string()));
        }

        let response: NotificationPageResponse =
            self.get_json("/api/notifications.json", query).await?;
        let page = NotificationPage::from_response(page, response);
        debug!(
            count = page.notifications.len(),
            current_page = page.current_page,
            total_pages = page.total_pages,
            "remote.fetch_page"
        );
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn trigger_sync(&self) -> Result<()> {
        info!("remote.trigger_sync");
        self.mutate(Method::POST, "/api/notifications/sync.json", Vec::new()).await
    }

    async fn is_syncing(&self) -> Result<bool> {
        let path = "/api/notifications/syncing.json";
        let response = self.http.send(self.request(Method::GET, path, &Vec::new())).await?;
        match response.status() {
            status if status.is_success() => Ok(false),
            StatusCode::LOCKED | StatusCode::SERVICE_UNAVAILABLE => Ok(true),
            _ => ensure_success(response, path).await.map(|_| false),
        }
    }

    #[instrument(skip(self))]
    async fn star(&self, id: NotificationId) -> Result<()> {
        self.mutate(Method::POST, &format!("/api/notifications/{id}/star.json"), Vec::new()).await
    }

    #[instrument(skip(self))]
    async fn archive(&self, ids: &[NotificationId]) -> Result<()> {
        self.mutate(Method::POST, "/api/notifications/archive_selected.json", id_pairs(ids)).await
    }

    #[instrument(skip(self))]
    async fn unarchive(&self, ids: &[NotificationId]) -> Result<()> {
        let mut query = id_pairs(ids);
        query.push(("value", "false".to_string()));
        self.mutate(Method::POST, "/api/notifications/archive_selected.json", query).await
    }

    #[instrument(skip(self))]
    async fn mute(&self, ids: &[NotificationId]) -> Result<()> {
        self.mutate(Method::POST, "/api/notifications/mute_selected.json", id_pairs(ids)).await
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, ids: &[NotificationId]) -> Result<()> {
        self.mutate(Method::GET, "/api/notifications/mark_read_selected.json", id_pairs(ids)).await
    }

    async fn pinned_searches(&self) -> Result<Vec<PinnedSearch>> {
        let response: PinnedSearchesResponse =
            self.get_json("/api/pinned_searches.json", Vec::new()).await?;
        Ok(response.pinned_searches)
    }

    async fn user_profile(&self) -> Result<UserProfile> {
        let response: UserProfileResponse =
            self.get_json("/api/users/profile.json", Vec::new()).await?;
        Ok(response.user)
    }

    async fn unread_count(&self) -> Result<u64> {
        let response: UnreadCountResponse =
            self.get_json("/api/notifications/unread_count.json", Vec::new()).await?;
        Ok(response.count)
    }
}

fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| TriageError::Config("API token contains invalid header characters".into()))?;
    auth.set_sensitive(true);

    let api_header = HeaderName::from_bytes(OCTOBOX_API_HEADER.as_bytes())
        .map_err(|err| TriageError::Internal(format!("invalid header name: {err}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(api_header, HeaderValue::from_static("1"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn id_pairs(ids: &[NotificationId]) -> QueryPairs {
    ids.iter().map(|id| ("id[]", id.to_string())).collect()
}

async fn ensure_success(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::from_status(status, path, &body).into())
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| TriageError::from(RemoteError::Network(err.to_string())))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| RemoteError::Decode(format!("{path}: {err}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> RemoteConfig {
        RemoteConfig {
            base_url: "https://octobox.example.com/".into(),
            api_token: token.map(str::to_string),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn missing_token_is_an_auth_error() {
        let err = OctoboxClient::from_config(&config(Some("  "))).expect_err("no token");
        assert!(matches!(err, TriageError::Auth(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = OctoboxClient::from_config(&config(Some("abc"))).expect("client");
        assert_eq!(client.base_url(), "https://octobox.example.com");
    }

    #[test]
    fn invalid_url_is_a_config_error() {
        let mut config = config(Some("abc"));
        config.base_url = "not a url".into();
        let err = OctoboxClient::from_config(&config).expect_err("bad url");
        assert!(matches!(err, TriageError::Config(_)));
    }

    #[test]
    fn ids_become_repeated_array_params() {
        assert_eq!(id_pairs(&[3, 4]), vec![("id[]", "3".to_string()), ("id[]", "4".to_string())]);
    }
}
