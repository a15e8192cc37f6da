use crate::api::DEFAULT_RECENT_ACTIVITY_LIMIT;
use crate::errors::AppError;
use crate::models::{
    Comment, DashboardResponse, Filter, FilterParams, MetricsSummary, PlatformStatsParams,
    RecentActivityParams,
};
use crate::state::AppState;
use crate::stats::build_view;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Form, Json,
};
use chrono::{Local, NaiveDate};
use serde_json::Value;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.dashboard.mount(today()).await;
    Html(render_index(&snapshot))
}

pub async fn apply(
    State(state): State<AppState>,
    Form(params): Form<FilterParams>,
) -> Result<Html<String>, AppError> {
    let current = state.dashboard.snapshot().await.filter;
    let filter = resolve_filter(params, current)?;
    let snapshot = state.dashboard.apply(filter).await;
    Ok(Html(render_index(&snapshot)))
}

pub async fn open_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let snapshot = state
        .dashboard
        .select_comment(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("no comment with id {id}")))?;
    Ok(Html(render_index(&snapshot)))
}

pub async fn close_modal(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.dashboard.close_modal().await;
    Html(render_index(&snapshot))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let snapshot = state.dashboard.snapshot().await;
    let view = build_view(&snapshot.metrics);
    Json(DashboardResponse {
        state: snapshot,
        view,
    })
}

pub async fn get_metrics(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<MetricsSummary>, AppError> {
    let filter = resolve_filter(params, Filter::trailing_week(today()))?;
    let report = state.backend.fetch_metrics(&filter).await?;
    let view = build_view(&report);
    Ok(Json(MetricsSummary { report, view }))
}

pub async fn get_comments(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let filter = resolve_filter(params, Filter::trailing_week(today()))?;
    Ok(Json(state.backend.fetch_comments(&filter).await))
}

pub async fn get_recent_activity(
    State(state): State<AppState>,
    Query(params): Query<RecentActivityParams>,
) -> Json<Value> {
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_ACTIVITY_LIMIT);
    Json(state.backend.fetch_recent_activity(limit).await)
}

pub async fn get_platform_stats(
    State(state): State<AppState>,
    Query(params): Query<PlatformStatsParams>,
) -> Json<Value> {
    Json(state.backend.fetch_platform_stats(&params.platform).await)
}

/// Fills the fields present in `params` over `base`. Blank dates keep the
/// base value; malformed ones are rejected.
fn resolve_filter(params: FilterParams, base: Filter) -> Result<Filter, AppError> {
    Ok(Filter {
        from_date: parse_date_or(params.from_date.as_deref(), base.from_date)?,
        to_date: parse_date_or(params.to_date.as_deref(), base.to_date)?,
        platform: params
            .platform
            .map(|platform| platform.trim().to_string())
            .unwrap_or(base.platform),
    })
}

fn parse_date_or(value: Option<&str>, fallback: NaiveDate) -> Result<NaiveDate, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(fallback),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request(format!("invalid date {raw:?}, expected YYYY-MM-DD"))),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Filter {
        Filter::trailing_week(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
    }

    #[test]
    fn missing_fields_keep_base_values() {
        let filter = resolve_filter(FilterParams::default(), base()).unwrap();
        assert_eq!(filter, base());
    }

    #[test]
    fn submitted_fields_override_base() {
        let params = FilterParams {
            from_date: Some("2023-12-01".to_string()),
            to_date: Some(" ".to_string()),
            platform: Some("reddit".to_string()),
        };
        let filter = resolve_filter(params, base()).unwrap();
        assert_eq!(filter.from_date.to_string(), "2023-12-01");
        assert_eq!(filter.to_date, base().to_date);
        assert_eq!(filter.platform, "reddit");
    }

    #[test]
    fn reversed_range_is_accepted() {
        let params = FilterParams {
            from_date: Some("2024-02-01".to_string()),
            to_date: Some("2024-01-01".to_string()),
            platform: None,
        };
        let filter = resolve_filter(params, base()).unwrap();
        assert!(filter.from_date > filter.to_date);
    }

    #[test]
    fn malformed_date_is_a_bad_request() {
        let params = FilterParams {
            from_date: Some("01/02/2024".to_string()),
            ..FilterParams::default()
        };
        let err = resolve_filter(params, base()).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
