//! Inline SVG charts for the dashboard page.

use crate::stats::{Series, Slice};
use crate::ui::escape_html;
use std::fmt::Write;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 260.0;
const PADDING_X: f64 = 44.0;
const PADDING_Y: f64 = 34.0;
const TOP: f64 = 24.0;
const TICKS: u32 = 4;

pub const PALETTE: [&str; 8] = [
    "#667eea", "#f093fb", "#4facfe", "#43e97b", "#fa709a", "#fee140", "#764ba2", "#f5576c",
];

pub fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Y-axis scale of a bar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Zero up to the largest value.
    Auto,
    /// Zero up to a fixed maximum, ticks suffixed with `%`.
    Percent,
}

/// Grouped bar chart: one group per category, one bar per series in each
/// group. `series[i].values[j]` is the bar of series `i` in category `j`.
pub fn bar_chart(label: &str, categories: &[String], series: &[Series], scale: Scale) -> String {
    if categories.is_empty() || series.is_empty() {
        return empty_chart(label);
    }

    let max = match scale {
        Scale::Percent => 100.0,
        Scale::Auto => series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0_f64, f64::max),
    };
    let max = if max <= 0.0 { 1.0 } else { max };
    let unit = if scale == Scale::Percent { "%" } else { "" };

    let plot_width = WIDTH - PADDING_X * 2.0;
    let scale_y = (HEIGHT - TOP - PADDING_Y) / max;
    let y = |value: f64| HEIGHT - PADDING_Y - value.clamp(0.0, max) * scale_y;

    let mut svg = open_svg(label);

    for i in 0..=TICKS {
        let value = max * f64::from(i) / f64::from(TICKS);
        let y_pos = y(value);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PADDING_X}" y1="{y_pos:.2}" x2="{x2}" y2="{y_pos:.2}" /><text class="chart-label" x="{tx}" y="{ty:.2}" text-anchor="end">{tick}{unit}</text>"#,
            x2 = WIDTH - PADDING_X,
            tx = PADDING_X - 10.0,
            ty = y_pos + 4.0,
            tick = format_axis_value(value),
        );
    }

    let group_width = plot_width / categories.len() as f64;
    let bar_width = group_width * 0.8 / series.len() as f64;
    for (col, category) in categories.iter().enumerate() {
        let group_x = PADDING_X + group_width * col as f64 + group_width * 0.1;
        for (row, s) in series.iter().enumerate() {
            let value = s.values.get(col).copied().unwrap_or_default();
            let top = y(value);
            let _ = write!(
                svg,
                r#"<rect class="chart-bar" x="{x:.2}" y="{top:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}"><title>{name}: {value}{unit}</title></rect>"#,
                x = group_x + bar_width * row as f64,
                w = bar_width,
                h = HEIGHT - PADDING_Y - top,
                fill = color(row),
                name = escape_html(&s.label),
                value = format_axis_value(value),
            );
        }
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{x:.2}" y="{y}" text-anchor="middle">{name}</text>"#,
            x = PADDING_X + group_width * (col as f64 + 0.5),
            y = HEIGHT - PADDING_Y + 18.0,
            name = escape_html(category),
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Ring chart with one arc per slice, drawn clockwise from twelve o'clock.
pub fn doughnut_chart(label: &str, slices: &[Slice]) -> String {
    let total = slices
        .iter()
        .fold(0u64, |total, slice| total.saturating_add(slice.count));
    if total == 0 {
        return empty_chart(label);
    }

    const OUTER: f64 = 110.0;
    const INNER: f64 = 62.0;
    let radius = (OUTER + INNER) / 2.0;
    let circumference = std::f64::consts::TAU * radius;
    let (cx, cy) = (WIDTH / 2.0, HEIGHT / 2.0);

    let mut svg = open_svg(label);
    let mut offset = 0.0;
    for (index, slice) in slices.iter().enumerate() {
        if slice.count == 0 {
            continue;
        }
        let length = slice.count as f64 / total as f64 * circumference;
        let _ = write!(
            svg,
            r#"<circle class="chart-arc" cx="{cx}" cy="{cy}" r="{radius}" fill="none" stroke="{stroke}" stroke-width="{width}" stroke-dasharray="{length:.2} {rest:.2}" stroke-dashoffset="{dash:.2}" transform="rotate(-90 {cx} {cy})"><title>{name}: {count}</title></circle>"#,
            stroke = color(index),
            width = OUTER - INNER,
            rest = circumference - length,
            dash = -offset,
            name = escape_html(&slice.label),
            count = slice.count,
        );
        offset += length;
    }
    let _ = write!(
        svg,
        r#"<text class="chart-total" x="{cx}" y="{y}" text-anchor="middle">{total}</text>"#,
        y = cy + 8.0,
    );
    svg.push_str("</svg>");
    svg
}

/// Legend entries as HTML, coloured in the same order as the chart series.
pub fn legend<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    let mut html = String::from(r#"<ul class="legend">"#);
    for (index, label) in labels.into_iter().enumerate() {
        let _ = write!(
            html,
            r#"<li><span class="swatch" style="background: {}"></span>{}</li>"#,
            color(index),
            escape_html(label),
        );
    }
    html.push_str("</ul>");
    html
}

pub fn format_axis_value(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

fn open_svg(label: &str) -> String {
    format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{}">"#,
        escape_html(label)
    )
}

fn empty_chart(label: &str) -> String {
    format!(
        r#"{}<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text></svg>"#,
        open_svg(label)
    )
}
