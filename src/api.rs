use crate::errors::NetworkError;
use crate::models::{Comment, Filter, MetricsReport};
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

pub const DEFAULT_RECENT_ACTIVITY_LIMIT: u32 = 10;

/// What a fetch resolves to when the backend call fails. The failure is
/// logged before the policy sees it.
pub trait ErrorPolicy<T> {
    type Output;

    fn settle(self, result: Result<T, NetworkError>) -> Self::Output;
}

/// Hand the error to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagate;

impl<T> ErrorPolicy<T> for Propagate {
    type Output = Result<T, NetworkError>;

    fn settle(self, result: Result<T, NetworkError>) -> Self::Output {
        result
    }
}

/// Resolve to the wrapped value instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback<T>(pub T);

impl<T> ErrorPolicy<T> for Fallback<T> {
    type Output = T;

    fn settle(self, result: Result<T, NetworkError>) -> T {
        result.unwrap_or(self.0)
    }
}

/// Read-only client for the bot's metrics backend.
///
/// No retries, no timeout and no cancellation: a hung request stays pending
/// until the backend answers.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &Url) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_metrics(&self, filter: &Filter) -> Result<MetricsReport, NetworkError> {
        self.get_json("metrics", &filter_query(filter), Propagate).await
    }

    pub async fn fetch_comments(&self, filter: &Filter) -> Vec<Comment> {
        self.get_json("comments", &filter_query(filter), Fallback(Vec::new())).await
    }

    pub async fn fetch_recent_activity(&self, limit: u32) -> Value {
        let query = [("limit", limit.to_string())];
        self.get_json("recent-activity", &query, Fallback(Value::Array(Vec::new())))
            .await
    }

    pub async fn fetch_platform_stats(&self, platform: &str) -> Value {
        let query = [("platform", platform.to_string())];
        self.get_json("platform-stats", &query, Fallback(Value::Object(Default::default())))
            .await
    }

    async fn get_json<T, P>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        policy: P,
    ) -> P::Output
    where
        T: DeserializeOwned,
        P: ErrorPolicy<T>,
    {
        let result = self.request(endpoint, query).await;
        if let Err(err) = &result {
            error!("error fetching {endpoint}: {err}");
        }
        policy.settle(result)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, NetworkError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!("GET {url} {query:?}");

        let transport = |source: reqwest::Error| NetworkError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = self.http.get(&url).query(query).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        response.json::<T>().await.map_err(transport)
    }
}

/// Query parameters for `/metrics` and `/comments`: both dates widened to
/// cover their whole calendar day.
pub fn filter_query(filter: &Filter) -> Vec<(&'static str, String)> {
    vec![
        ("from_date", start_of_day(filter.from_date)),
        ("to_date", end_of_day(filter.to_date)),
        ("platform", filter.platform.clone()),
    ]
}

pub fn start_of_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00").to_string()
}

pub fn end_of_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT23:59:59").to_string()
}
