use crate::dashboard::DashboardState;
use crate::stats::DashboardView;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts per action type for a single platform.
pub type ActionCounts = BTreeMap<String, u64>;

/// Backend `/metrics` payload: platform -> action type -> count.
pub type MetricsReport = BTreeMap<String, ActionCounts>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub platform: String,
    pub subreddit: String,
    pub post_title: Option<String>,
    pub comment_text: Option<String>,
    pub action_type: String,
    pub timestamp: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Date range and platform scoping both backend queries. An empty
/// `platform` means every platform. `from_date <= to_date` is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub platform: String,
}

impl Filter {
    pub const DEFAULT_WINDOW_DAYS: i64 = 7;

    /// The window shown on mount: `today - 7 days` through `today`, all platforms.
    pub fn trailing_week(today: NaiveDate) -> Self {
        Self {
            from_date: today - Duration::days(Self::DEFAULT_WINDOW_DAYS),
            to_date: today,
            platform: String::new(),
        }
    }
}

/// Filter fields as submitted by the page form or the JSON API query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentActivityParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformStatsParams {
    pub platform: String,
}

#[derive(Debug, Serialize)]
pub struct MetricsSummary {
    pub report: MetricsReport,
    pub view: DashboardView,
}

/// Session snapshot served by `/api/dashboard`.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub state: DashboardState,
    pub view: DashboardView,
}
