use crate::models::MetricsReport;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// The action type counted as a success when computing success rates.
pub const SUCCESS_ACTION: &str = "comment_posted";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRow {
    pub action: String,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformCard {
    pub platform: String,
    pub rows: Vec<ActionRow>,
    pub success_rate: f64,
}

/// One bar series: a value per platform, in `DashboardView::platforms` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub action: String,
    pub label: String,
    pub count: u64,
}

/// Everything the page draws, derived from one metrics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub platforms: Vec<String>,
    pub action_types: Vec<String>,
    pub cards: Vec<PlatformCard>,
    pub activity: Vec<Series>,
    pub success_rates: Series,
    pub distribution: Vec<Slice>,
}

const SUCCESS_RATE_LABEL: &str = "Success Rate (%)";

pub fn build_view(report: &MetricsReport) -> DashboardView {
    let platforms: Vec<String> = report.keys().cloned().collect();
    let action_types = distinct_action_types(report);

    let cards = report
        .iter()
        .map(|(platform, counts)| PlatformCard {
            platform: platform.clone(),
            rows: counts
                .iter()
                .map(|(action, count)| ActionRow {
                    action: action.clone(),
                    label: format_label(action),
                    count: *count,
                })
                .collect(),
            success_rate: success_rate(report, platform),
        })
        .collect();

    let activity = action_types
        .iter()
        .map(|action| Series {
            label: format_label(action),
            values: platforms
                .iter()
                .map(|platform| count_of(report, platform, action) as f64)
                .collect(),
        })
        .collect();

    let success_rates = Series {
        label: SUCCESS_RATE_LABEL.to_string(),
        values: platforms
            .iter()
            .map(|platform| success_rate(report, platform))
            .collect(),
    };

    let totals = action_distribution(report);
    let distribution = action_types
        .iter()
        .map(|action| Slice {
            action: action.clone(),
            label: format_label(action),
            count: totals.get(action).copied().unwrap_or_default(),
        })
        .collect();

    DashboardView {
        platforms,
        action_types,
        cards,
        activity,
        success_rates,
        distribution,
    }
}

/// Every action type that appears under any platform, each once, in the
/// order first met while walking the report.
pub fn distinct_action_types(report: &MetricsReport) -> Vec<String> {
    let mut seen = HashSet::new();
    report
        .values()
        .flat_map(|counts| counts.keys())
        .filter(|action| seen.insert(*action))
        .cloned()
        .collect()
}

/// Share of a platform's actions that are `comment_posted`, as a percentage
/// rounded to one decimal. A platform with no actions (or one missing from
/// the report) yields `0.0`.
pub fn success_rate(report: &MetricsReport, platform: &str) -> f64 {
    let Some(counts) = report.get(platform) else {
        return 0.0;
    };
    let total: u64 = counts.values().fold(0u64, |sum, count| sum.saturating_add(*count));
    if total == 0 {
        return 0.0;
    }
    let successful = counts.get(SUCCESS_ACTION).copied().unwrap_or_default();
    let rate = successful as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

/// Per action type, the sum of its counts across all platforms.
pub fn action_distribution(report: &MetricsReport) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for counts in report.values() {
        for (action, count) in counts {
            let entry = totals.entry(action.clone()).or_insert(0u64);
            *entry = entry.saturating_add(*count);
        }
    }
    totals
}

/// `comment_posted` -> `Comment Posted`: underscores become spaces and the
/// first letter of every word is upper-cased. Other characters are kept.
pub fn format_label(action: &str) -> String {
    let mut label = String::with_capacity(action.len());
    let mut in_word = false;
    for ch in action.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        let is_word = ch.is_ascii_alphanumeric();
        if is_word && !in_word {
            label.push(ch.to_ascii_uppercase());
        } else {
            label.push(ch);
        }
        in_word = is_word;
    }
    label
}

/// One decimal, as shown on cards and chart axes.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}")
}

fn count_of(report: &MetricsReport, platform: &str, action: &str) -> u64 {
    report
        .get(platform)
        .and_then(|counts| counts.get(action))
        .copied()
        .unwrap_or_default()
}
