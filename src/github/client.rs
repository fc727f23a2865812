// GitHub GraphQL HTTP client.
// Handles authentication, timeouts, rate limit tracking, and per-operation query counting.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::error::{Result, StatsError};

use super::counter::{QueryCounts, QueryKind};
use super::types::{GraphQlResponse, RateLimit};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub GraphQL client with authentication, rate limit and query tracking.
pub struct GitHubClient {
    client: Client,
    endpoint: String,
    rate_limit: RateLimit,
    queries: QueryCounts,
}

impl GitHubClient {
    /// Create a new client against the public GitHub API.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE)
    }

    /// Create a new client against a custom API base (GitHub Enterprise, tests).
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("bearer {}", token))
                .map_err(|e| StatsError::Other(e.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("profile-stats/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StatsError::Http)?;

        Ok(Self {
            client,
            endpoint: format!("{}/graphql", base_url.trim_end_matches('/')),
            rate_limit: RateLimit::default(),
            queries: QueryCounts::default(),
        })
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    /// Requests issued so far, by operation.
    pub fn query_counts(&self) -> QueryCounts {
        self.queries
    }

    /// Send one GraphQL query and decode its `data` member.
    pub async fn query<V, T>(&mut self, kind: QueryKind, query: &str, variables: &V) -> Result<T>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.queries.record(kind);
        tracing::debug!(operation = kind.name(), "graphql request");

        let body = json!({ "query": query, "variables": variables });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(StatsError::Http)?;

        self.update_rate_limit(&response);
        let response = self.check_response(kind, response).await?;

        let envelope: GraphQlResponse<T> = response.json().await?;
        match envelope.data {
            Some(data) => Ok(data),
            None => Err(StatsError::GraphQl {
                operation: kind.name(),
                message: envelope
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
        }
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        if let Some(limit) = header("x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            self.rate_limit.remaining = Some(remaining);
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, kind: QueryKind, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                let detail = if self.rate_limit.remaining == Some(0) {
                    let reset_at =
                        chrono::DateTime::from_timestamp(self.rate_limit.reset as i64, 0)
                            .map(|dt| dt.format("%H:%M:%S").to_string())
                            .unwrap_or_else(|| "unknown".to_string());
                    format!("primary rate limit exhausted, resets at {}", reset_at)
                } else {
                    "hit the undocumented anti-abuse limit".to_string()
                };
                Err(StatsError::RateLimited {
                    operation: kind.name(),
                    detail,
                    queries: self.queries,
                })
            }
            status => Err(StatsError::Transport {
                operation: kind.name(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
                queries: self.queries,
            }),
        }
    }
}
