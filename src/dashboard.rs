//! Dashboard session state.
//!
//! The page state is a plain value. Every interaction is an [`Action`], and
//! [`DashboardState::reduce`] turns the current state plus an action into the
//! next state. [`Dashboard`] owns the shared current state and runs the
//! backend fetches around it.

use crate::api::BackendClient;
use crate::models::{Comment, Filter, MetricsReport};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// How the metrics and comments fetches are scheduled relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Both requests in flight at once. Used on mount.
    Parallel,
    /// Comments are requested only after metrics settled. Used on apply.
    Sequential,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Fresh page: default filter, empty data, modal closed. Request tokens
    /// survive so responses from before the remount are still discarded.
    Mounted { filter: Filter },
    /// The submitted filter form, replacing every field in one step.
    FilterApplied(Filter),
    MetricsRequested,
    /// `report` is `None` when the fetch failed.
    MetricsSettled {
        token: u64,
        report: Option<MetricsReport>,
    },
    CommentsRequested,
    CommentsSettled {
        token: u64,
        comments: Vec<Comment>,
    },
    CommentSelected(Comment),
    ModalClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub filter: Filter,
    pub metrics: MetricsReport,
    pub comments: Vec<Comment>,
    pub metrics_loading: bool,
    pub comments_loading: bool,
    pub selected: Option<Comment>,
    #[serde(skip)]
    metrics_token: u64,
    #[serde(skip)]
    comments_token: u64,
}

impl DashboardState {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            metrics: MetricsReport::new(),
            comments: Vec::new(),
            metrics_loading: true,
            comments_loading: false,
            selected: None,
            metrics_token: 0,
            comments_token: 0,
        }
    }

    pub fn metrics_token(&self) -> u64 {
        self.metrics_token
    }

    pub fn comments_token(&self) -> u64 {
        self.comments_token
    }

    pub fn modal_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn reduce(&self, action: Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::Mounted { filter } => {
                next = Self {
                    metrics_token: self.metrics_token,
                    comments_token: self.comments_token,
                    ..Self::new(filter)
                };
            }
            Action::FilterApplied(filter) => next.filter = filter,
            Action::MetricsRequested => {
                next.metrics_token = self.metrics_token + 1;
                next.metrics_loading = true;
            }
            Action::MetricsSettled { token, report } => {
                if token != self.metrics_token {
                    debug!(token, latest = self.metrics_token, "discarding stale metrics response");
                    return next;
                }
                if let Some(report) = report {
                    next.metrics = report;
                }
                next.metrics_loading = false;
            }
            Action::CommentsRequested => {
                next.comments_token = self.comments_token + 1;
                next.comments_loading = true;
            }
            Action::CommentsSettled { token, comments } => {
                if token != self.comments_token {
                    debug!(token, latest = self.comments_token, "discarding stale comments response");
                    return next;
                }
                next.comments = comments;
                next.comments_loading = false;
            }
            Action::CommentSelected(comment) => next.selected = Some(comment),
            Action::ModalClosed => next.selected = None,
        }
        next
    }
}

/// The single dashboard session served by this process.
#[derive(Clone)]
pub struct Dashboard {
    backend: BackendClient,
    state: Arc<Mutex<DashboardState>>,
}

impl Dashboard {
    pub fn new(backend: BackendClient, today: NaiveDate) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(DashboardState::new(Filter::trailing_week(today)))),
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    pub async fn dispatch(&self, action: Action) -> DashboardState {
        let mut state = self.state.lock().await;
        *state = state.reduce(action);
        state.clone()
    }

    /// Resets the session to the default window and loads both sections
    /// concurrently.
    pub async fn mount(&self, today: NaiveDate) -> DashboardState {
        self.dispatch(Action::Mounted {
            filter: Filter::trailing_week(today),
        })
        .await;
        self.load(FetchStrategy::Parallel).await
    }

    /// Writes the edited filter into the session and reloads, metrics first.
    pub async fn apply(&self, filter: Filter) -> DashboardState {
        info!(
            from = %filter.from_date,
            to = %filter.to_date,
            platform = %filter.platform,
            "applying filters"
        );
        self.dispatch(Action::FilterApplied(filter)).await;
        self.load(FetchStrategy::Sequential).await
    }

    pub async fn load(&self, strategy: FetchStrategy) -> DashboardState {
        match strategy {
            FetchStrategy::Parallel => {
                tokio::join!(self.load_metrics(), self.load_comments());
            }
            FetchStrategy::Sequential => {
                self.load_metrics().await;
                self.load_comments().await;
            }
        }
        self.snapshot().await
    }

    /// Opens the modal for a comment of the current list. Returns `None` when
    /// no comment has that id.
    pub async fn select_comment(&self, id: i64) -> Option<DashboardState> {
        let mut state = self.state.lock().await;
        let comment = state.comments.iter().find(|comment| comment.id == id)?.clone();
        *state = state.reduce(Action::CommentSelected(comment));
        Some(state.clone())
    }

    pub async fn close_modal(&self) -> DashboardState {
        self.dispatch(Action::ModalClosed).await
    }

    async fn load_metrics(&self) {
        let requested = self.dispatch(Action::MetricsRequested).await;
        let report = self.backend.fetch_metrics(&requested.filter).await.ok();
        self.dispatch(Action::MetricsSettled {
            token: requested.metrics_token,
            report,
        })
        .await;
    }

    async fn load_comments(&self) {
        let requested = self.dispatch(Action::CommentsRequested).await;
        let comments = self.backend.fetch_comments(&requested.filter).await;
        self.dispatch(Action::CommentsSettled {
            token: requested.comments_token,
            comments,
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> Filter {
        Filter::trailing_week(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
    }

    fn comment(id: i64) -> Comment {
        Comment {
            id,
            platform: "reddit".to_string(),
            subreddit: "rust".to_string(),
            post_title: Some("Title".to_string()),
            comment_text: Some("Nice post".to_string()),
            action_type: "comment_posted".to_string(),
            timestamp: "2024-01-05T10:00:00".to_string(),
            success: true,
            error: None,
        }
    }

    fn report(count: u64) -> MetricsReport {
        let mut report = MetricsReport::new();
        report
            .entry("reddit".to_string())
            .or_default()
            .insert("comment_posted".to_string(), count);
        report
    }

    #[test]
    fn new_state_waits_for_metrics() {
        let state = DashboardState::new(filter());
        assert!(state.metrics_loading);
        assert!(!state.comments_loading);
        assert!(!state.modal_open());
        assert_eq!(state.filter.from_date.to_string(), "2024-01-01");
        assert_eq!(state.filter.to_date.to_string(), "2024-01-08");
        assert_eq!(state.filter.platform, "");
    }

    #[test]
    fn reduce_leaves_previous_state_untouched() {
        let state = DashboardState::new(filter());
        let next = state.reduce(Action::FilterApplied(Filter {
            platform: "reddit".to_string(),
            ..filter()
        }));
        assert_eq!(state.filter.platform, "");
        assert_eq!(next.filter.platform, "reddit");
    }

    #[test]
    fn applied_filter_replaces_every_field() {
        let submitted = Filter {
            from_date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            platform: "reddit".to_string(),
        };
        let state = DashboardState::new(filter())
            .reduce(Action::FilterApplied(submitted.clone()));
        assert_eq!(state.filter, submitted);
        assert_eq!(state.metrics_token(), 0);
    }

    #[test]
    fn settled_metrics_replace_report_and_clear_loading() {
        let state = DashboardState::new(filter()).reduce(Action::MetricsRequested);
        let token = state.metrics_token();
        let state = state.reduce(Action::MetricsSettled {
            token,
            report: Some(report(3)),
        });
        assert!(!state.metrics_loading);
        assert_eq!(state.metrics, report(3));
    }

    #[test]
    fn failed_metrics_keep_previous_report() {
        let state = DashboardState::new(filter()).reduce(Action::MetricsRequested);
        let state = state.reduce(Action::MetricsSettled {
            token: state.metrics_token(),
            report: Some(report(3)),
        });

        let state = state.reduce(Action::MetricsRequested);
        assert!(state.metrics_loading);
        let state = state.reduce(Action::MetricsSettled {
            token: state.metrics_token(),
            report: None,
        });
        assert!(!state.metrics_loading);
        assert_eq!(state.metrics, report(3));
    }

    #[test]
    fn stale_metrics_response_is_discarded() {
        let state = DashboardState::new(filter()).reduce(Action::MetricsRequested);
        let stale = state.metrics_token();
        let state = state.reduce(Action::MetricsRequested);
        let latest = state.metrics_token();
        assert!(latest > stale);

        let state = state.reduce(Action::MetricsSettled {
            token: latest,
            report: Some(report(5)),
        });
        let state = state.reduce(Action::MetricsSettled {
            token: stale,
            report: Some(report(1)),
        });
        assert_eq!(state.metrics, report(5));
        assert!(!state.metrics_loading);
    }

    #[test]
    fn stale_response_does_not_clear_loading() {
        let state = DashboardState::new(filter()).reduce(Action::CommentsRequested);
        let stale = state.comments_token();
        let state = state.reduce(Action::CommentsRequested);

        let state = state.reduce(Action::CommentsSettled {
            token: stale,
            comments: vec![comment(1)],
        });
        assert!(state.comments_loading);
        assert!(state.comments.is_empty());
    }

    #[test]
    fn remount_keeps_request_tokens() {
        let state = DashboardState::new(filter())
            .reduce(Action::MetricsRequested)
            .reduce(Action::CommentsRequested)
            .reduce(Action::CommentSelected(comment(1)));
        let state = state.reduce(Action::Mounted { filter: filter() });
        assert_eq!(state.metrics_token(), 1);
        assert_eq!(state.comments_token(), 1);
        assert!(!state.modal_open());
        assert!(state.metrics_loading);
    }

    #[test]
    fn modal_opens_and_closes() {
        let state = DashboardState::new(filter()).reduce(Action::CommentSelected(comment(7)));
        assert_eq!(state.selected.as_ref().map(|c| c.id), Some(7));
        let state = state.reduce(Action::ModalClosed);
        assert!(state.selected.is_none());
    }
}
