use crate::charts::{bar_chart, doughnut_chart, legend, Scale};
use crate::dashboard::DashboardState;
use crate::models::Comment;
use crate::stats::{build_view, format_label, format_rate, DashboardView};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt::{Display, Write};

pub const POST_TITLE_PREVIEW: usize = 80;
pub const COMMENT_PREVIEW: usize = 150;

pub fn render_index(state: &DashboardState) -> String {
    let body = if state.metrics_loading {
        LOADING_HTML.to_string()
    } else {
        let view = build_view(&state.metrics);
        DASHBOARD_HTML
            .replace("{{FILTERS}}", &render_filters(state))
            .replace("{{CARDS}}", &render_cards(&view))
            .replace("{{CHARTS}}", &render_charts(&view))
            .replace("{{COMMENTS}}", &render_comments(state))
            .replace("{{MODAL}}", &state.selected.as_ref().map(render_modal).unwrap_or_default())
    };
    PAGE_HTML.replace("{{BODY}}", &body)
}

fn render_filters(state: &DashboardState) -> String {
    let filter = &state.filter;
    let mut platforms: Vec<String> = vec!["reddit".to_string()];
    for platform in state.metrics.keys().chain(std::iter::once(&filter.platform)) {
        if !platform.is_empty() && !platforms.contains(platform) {
            platforms.push(platform.clone());
        }
    }

    let mut options = option_html("", "All Platforms", filter.platform.is_empty());
    for platform in &platforms {
        options.push_str(&option_html(
            platform,
            &format_label(platform),
            *platform == filter.platform,
        ));
    }

    FILTERS_HTML
        .replace("{{FROM}}", &filter.from_date.to_string())
        .replace("{{TO}}", &filter.to_date.to_string())
        .replace("{{OPTIONS}}", &options)
}

fn option_html(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

fn render_cards(view: &DashboardView) -> String {
    let mut html = String::new();
    for (index, card) in view.cards.iter().enumerate() {
        let accent = if index % 2 == 0 { "accent-a" } else { "accent-b" };
        let _ = write!(
            html,
            r#"<article class="card {accent}"><h3>{}</h3>"#,
            escape_html(&card.platform)
        );
        for row in &card.rows {
            let _ = write!(
                html,
                r#"<div class="row"><span class="label">{}</span><span class="value">{}</span></div>"#,
                escape_html(&row.label),
                row.count
            );
        }
        let _ = write!(
            html,
            r#"<div class="rate">Success Rate: {}%</div></article>"#,
            format_rate(card.success_rate)
        );
    }
    html
}

fn render_charts(view: &DashboardView) -> String {
    let activity_labels = view.activity.iter().map(|series| series.label.as_str());
    let distribution_labels = view.distribution.iter().map(|slice| slice.label.as_str());

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="chart-card"><h3>Bot Activity Overview</h3>{}{}</div>"#,
        bar_chart("Bot Activity Overview", &view.platforms, &view.activity, Scale::Auto),
        legend(activity_labels)
    );
    let _ = write!(
        html,
        r#"<div class="chart-card"><h3>Success Rate by Platform</h3>{}{}</div>"#,
        bar_chart(
            "Success Rate by Platform",
            &view.platforms,
            std::slice::from_ref(&view.success_rates),
            Scale::Percent
        ),
        legend([view.success_rates.label.as_str()])
    );
    let _ = write!(
        html,
        r#"<div class="chart-card"><h3>Action Distribution</h3>{}{}</div>"#,
        doughnut_chart("Action Distribution", &view.distribution),
        legend(distribution_labels)
    );
    html
}

fn render_comments(state: &DashboardState) -> String {
    if state.comments_loading {
        return r#"<p class="placeholder">Loading comments...</p>"#.to_string();
    }
    if state.comments.is_empty() {
        return r#"<p class="placeholder">No comments found for the selected date range.</p>"#
            .to_string();
    }

    let mut html = String::from(r#"<ul class="comments">"#);
    for comment in &state.comments {
        let _ = write!(
            html,
            r#"<li><a class="comment" href="/comments/{id}"><div class="comment-body"><span class="subreddit">{subreddit}</span><strong>{title}</strong><p>{text}</p></div><div class="comment-meta"><div>{platform}</div><div>{time}</div>{status}</div>{error}</a></li>"#,
            id = comment.id,
            subreddit = escape_html(&comment.subreddit),
            title = escape_html(&truncate_text(
                comment.post_title.as_deref().unwrap_or_default(),
                POST_TITLE_PREVIEW
            )),
            text = escape_html(&truncate_text(
                comment.comment_text.as_deref().unwrap_or_default(),
                COMMENT_PREVIEW
            )),
            platform = escape_html(&comment.platform),
            time = escape_html(&format_timestamp(&comment.timestamp)),
            status = status_badge(comment.success),
            error = comment
                .error
                .as_deref()
                .map(|error| format!(r#"<div class="error">Error: {}</div>"#, escape_html(error)))
                .unwrap_or_default(),
        );
    }
    html.push_str("</ul>");
    html
}

fn render_modal(comment: &Comment) -> String {
    let error = comment
        .error
        .as_deref()
        .map(|error| {
            format!(
                r#"<section class="error"><h3>Error</h3><div>{}</div></section>"#,
                escape_html(error)
            )
        })
        .unwrap_or_default();

    MODAL_HTML
        .replace("{{PLATFORM}}", &escape_html(&comment.platform))
        .replace("{{STATUS}}", &status_badge(comment.success))
        .replace("{{SUBREDDIT}}", &escape_html(&comment.subreddit))
        .replace(
            "{{POST_TITLE}}",
            &escape_html(comment.post_title.as_deref().unwrap_or_default()),
        )
        .replace(
            "{{COMMENT_TEXT}}",
            &escape_html(comment.comment_text.as_deref().unwrap_or_default()),
        )
        .replace("{{ACTION}}", &escape_html(&format_label(&comment.action_type)))
        .replace("{{TIMESTAMP}}", &escape_html(&format_timestamp(&comment.timestamp)))
        .replace("{{ERROR}}", &error)
}

fn status_badge(success: bool) -> String {
    if success {
        r#"<span class="badge ok">Success</span>"#.to_string()
    } else {
        r#"<span class="badge failed">Failed</span>"#.to_string()
    }
}

/// Cuts `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Renders a backend timestamp in local time. RFC 3339 values keep their
/// offset; naive ones are UTC. Anything else is shown as received.
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

fn format_timestamp_in<Tz>(raw: &str, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc()));

    match parsed {
        Ok(instant) => instant
            .with_timezone(zone)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Escapes text for HTML bodies and attributes. `{` is encoded too so user
/// text can never form a `{{PLACEHOLDER}}` of the page templates.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('{', "&#123;")
}

const LOADING_HTML: &str = r#"<div class="loading">Loading metrics...</div>"#;

const FILTERS_HTML: &str = r#"<form class="filters" method="post" action="/apply">
      <h3>Analytics Filters</h3>
      <div class="fields">
        <label>From Date<input type="date" name="from_date" value="{{FROM}}" /></label>
        <label>To Date<input type="date" name="to_date" value="{{TO}}" /></label>
        <label>Platform<select name="platform">{{OPTIONS}}</select></label>
        <button type="submit">Apply Filters</button>
      </div>
    </form>"#;

const MODAL_HTML: &str = r#"<div class="modal">
      <a class="backdrop" href="/modal/close" aria-label="Close"></a>
      <div class="panel" role="dialog" aria-modal="true">
        <a class="close" href="/modal/close" aria-label="Close">&times;</a>
        <h2>Comment Details</h2>
        <div class="detail-head"><span>Platform: {{PLATFORM}}</span>{{STATUS}}</div>
        <section><h3>Subreddit</h3><div>{{SUBREDDIT}}</div></section>
        <section><h3>Post Title</h3><div>{{POST_TITLE}}</div></section>
        <section><h3>Comment</h3><div class="comment-text">{{COMMENT_TEXT}}</div></section>
        <section><h3>Action</h3><div>{{ACTION}}</div></section>
        <section><h3>Timestamp</h3><div>{{TIMESTAMP}}</div></section>
        {{ERROR}}
      </div>
    </div>"#;

const DASHBOARD_HTML: &str = r#"<header>
      <h1>Social Engagement Bot</h1>
      <p class="subtitle">Analytics dashboard for automated social media engagement.</p>
    </header>
    {{FILTERS}}
    <section class="cards">{{CARDS}}</section>
    <section class="charts">{{CHARTS}}</section>
    <section class="comment-log">
      <h3>Recent Comments</h3>
      {{COMMENTS}}
    </section>
    {{MODAL}}"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Social Engagement Bot</title>
  <style>
    :root {
      --bg-1: #667eea;
      --bg-2: #764ba2;
      --ink: #2c3e50;
      --muted: #6b7785;
      --ok: #4facfe;
      --failed: #fa709a;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(44, 62, 80, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1) 0%, var(--bg-2) 100%);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1200px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header h1 {
      margin: 0;
      color: white;
      font-size: clamp(2rem, 4vw, 3rem);
    }

    header .subtitle {
      margin: 8px 0 0;
      color: rgba(255, 255, 255, 0.85);
    }

    .filters,
    .card,
    .chart-card,
    .comment-log {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    .filters h3 {
      margin: 0 0 16px;
    }

    .fields {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
      align-items: end;
    }

    .fields label {
      display: grid;
      gap: 6px;
      font-weight: 600;
    }

    input,
    select {
      padding: 10px 12px;
      border: 2px solid #e1e8ed;
      border-radius: 12px;
      font-size: 1rem;
    }

    button {
      border: none;
      border-radius: 12px;
      padding: 12px 20px;
      font-size: 1rem;
      font-weight: 600;
      color: white;
      background: linear-gradient(135deg, var(--bg-1), var(--bg-2));
      cursor: pointer;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 20px;
    }

    .card {
      border-top: 4px solid var(--bg-1);
    }

    .card.accent-b {
      border-top-color: #f5576c;
    }

    .card h3 {
      margin: 0 0 12px;
      text-transform: capitalize;
    }

    .row {
      display: flex;
      justify-content: space-between;
      padding: 6px 0;
      border-bottom: 1px solid rgba(44, 62, 80, 0.08);
    }

    .row .value {
      font-weight: 700;
    }

    .rate {
      margin-top: 12px;
      font-weight: 600;
      color: var(--bg-2);
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(340px, 1fr));
      gap: 20px;
    }

    .chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-grid {
      stroke: rgba(44, 62, 80, 0.12);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .chart-total {
      fill: var(--ink);
      font-size: 22px;
      font-weight: 700;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      padding: 0;
      margin: 12px 0 0;
      list-style: none;
      font-size: 0.9rem;
    }

    .swatch {
      display: inline-block;
      width: 12px;
      height: 12px;
      border-radius: 3px;
      margin-right: 6px;
    }

    .comments {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 12px;
    }

    .comment {
      display: grid;
      grid-template-columns: 1fr auto;
      gap: 12px;
      padding: 16px;
      border-radius: 14px;
      border: 1px solid rgba(44, 62, 80, 0.08);
      background: white;
      color: inherit;
      text-decoration: none;
    }

    .comment p {
      margin: 6px 0 0;
      color: var(--muted);
    }

    .subreddit {
      display: block;
      font-size: 0.85rem;
      color: var(--bg-2);
      font-weight: 600;
    }

    .comment-meta {
      text-align: right;
      font-size: 0.85rem;
      color: var(--muted);
    }

    .badge {
      display: inline-block;
      margin-top: 6px;
      padding: 2px 10px;
      border-radius: 999px;
      font-weight: 600;
      color: white;
    }

    .badge.ok {
      background: var(--ok);
    }

    .badge.failed {
      background: var(--failed);
    }

    .error {
      grid-column: 1 / -1;
      color: #d63031;
    }

    .placeholder,
    .loading {
      text-align: center;
      color: var(--muted);
      padding: 24px;
    }

    .loading {
      color: white;
      font-size: 1.2rem;
      margin-top: 30vh;
    }

    .modal {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      z-index: 1000;
    }

    .backdrop {
      position: absolute;
      inset: 0;
      background: rgba(0, 0, 0, 0.5);
    }

    .panel {
      position: relative;
      width: min(800px, 92vw);
      max-height: 90vh;
      overflow-y: auto;
      background: white;
      border-radius: 20px;
      padding: 32px;
      display: grid;
      gap: 16px;
    }

    .panel h3 {
      margin: 0 0 6px;
      font-size: 1rem;
    }

    .panel .close {
      position: absolute;
      top: 16px;
      right: 20px;
      font-size: 1.6rem;
      color: var(--muted);
      text-decoration: none;
    }

    .detail-head {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .comment-text {
      white-space: pre-wrap;
      line-height: 1.6;
    }
  </style>
</head>
<body>
  <main class="app">
    {{BODY}}
  </main>
</body>
</html>
"#;
