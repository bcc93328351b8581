//! Human-readable terminal rendering of a dashboard.

use crate::config::MetricsBasis;
use crate::types::{ChartData, DashboardView, DataPoint, Metric};
use crate::utils::truncate_str;
use serde_json::Value;

const WIDTH: usize = 80;
const CELL: usize = 14;

/// Render the dashboard as plain text, one section after another.
pub fn render_text(view: &DashboardView) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(String::new());
    lines.push("=".repeat(WIDTH));
    lines.push("SALES DASHBOARD".to_string());
    lines.push("=".repeat(WIDTH));
    lines.push(String::new());

    overview(view, &mut lines);
    preview(view, &mut lines);
    statistics(view, &mut lines);
    missing_values(view, &mut lines);
    metrics(view, &mut lines);

    for chart in &view.charts {
        heading(&mut lines, &chart.title.to_uppercase());
        match &chart.data {
            ChartData::Bar { x, y, points } | ChartData::Line { x, y, points } => {
                lines.push(format!("  {} by {}", y, x));
                data_points(points, &mut lines);
            }
            ChartData::Pie {
                names,
                values,
                slices,
            } => {
                lines.push(format!("  {} share by {}", values, names));
                let total: f64 = slices.iter().map(|s| s.value).sum();
                for slice in slices {
                    let share = if total != 0.0 {
                        slice.value / total * 100.0
                    } else {
                        0.0
                    };
                    lines.push(format!(
                        "  {:<24} {:>14.2} ({:.1}%)",
                        truncate_str(&slice.label, 24),
                        slice.value,
                        share
                    ));
                }
            }
            ChartData::Heatmap { columns, matrix } => {
                let mut header = format!("  {:<w$}", "", w = CELL);
                for col in columns {
                    header.push_str(&format!("{:>w$}", truncate_str(col, CELL - 1), w = CELL));
                }
                lines.push(header);
                for (name, row) in columns.iter().zip(matrix) {
                    let mut line = format!("  {:<w$}", truncate_str(name, CELL - 1), w = CELL);
                    for cell in row {
                        let rendered = cell.map_or("-".to_string(), |r| format!("{:.2}", r));
                        line.push_str(&format!("{:>w$}", rendered, w = CELL));
                    }
                    lines.push(line);
                }
            }
        }
        lines.push(String::new());
    }

    if !view.skipped.is_empty() {
        heading(&mut lines, "SKIPPED SECTIONS");
        for section in &view.skipped {
            lines.push(format!("  - {}: {}", section.kind.title(), section.reason));
        }
        lines.push(String::new());
    }

    if !view.processing_steps.is_empty() {
        lines.push("Processing Steps:".to_string());
        for step in &view.processing_steps {
            lines.push(format!("  - {}", step));
        }
        lines.push(String::new());
    }

    lines.push(format!("Duration: {}ms", view.duration_ms));
    lines.push("Use --json for machine-readable output".to_string());
    lines.push("=".repeat(WIDTH));

    lines.join("\n")
}

fn heading(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push("-".repeat(40));
}

fn overview(view: &DashboardView, lines: &mut Vec<String>) {
    let cleaning = &view.cleaning;

    lines.push(format!("Source: {}", view.source.name()));
    lines.push(format!(
        "Rows: {} -> {} ({} duplicates removed, {} rows with missing values removed)",
        cleaning.rows_before,
        cleaning.rows_after,
        cleaning.duplicates_removed,
        cleaning.rows_with_missing_removed
    ));
    for (original, normalized) in &cleaning.renamed_columns {
        lines.push(format!("  Renamed '{}' -> '{}'", original, normalized));
    }
    if !view.derived_columns.is_empty() {
        lines.push(format!("Derived columns: {}", view.derived_columns.join(", ")));
    }
    lines.push(String::new());
}

fn preview(view: &DashboardView, lines: &mut Vec<String>) {
    let table = &view.preview;
    heading(
        lines,
        &format!(
            "DATASET PREVIEW (first {} of {} rows)",
            table.rows.len(),
            table.total_rows
        ),
    );

    lines.push(row_line(table.columns.iter().map(|c| c.as_str())));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        lines.push(row_line(cells.iter().map(|c| c.as_str())));
    }
    lines.push(String::new());
}

fn statistics(view: &DashboardView, lines: &mut Vec<String>) {
    heading(lines, "SUMMARY STATISTICS");
    if view.summary_statistics.is_empty() {
        lines.push("  No numeric columns".to_string());
        lines.push(String::new());
        return;
    }

    lines.push(format!(
        "  {:<18} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    ));
    for stats in &view.summary_statistics {
        lines.push(format!(
            "  {:<18} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            truncate_str(&stats.column, 18),
            stats.count,
            number(stats.mean),
            number(stats.std),
            number(stats.min),
            number(stats.q25),
            number(stats.median),
            number(stats.q75),
            number(stats.max)
        ));
    }
    lines.push(String::new());
}

fn missing_values(view: &DashboardView, lines: &mut Vec<String>) {
    heading(lines, "MISSING VALUES");
    for count in &view.missing_values {
        lines.push(format!("  {:<30} {}", truncate_str(&count.column, 30), count.missing));
    }
    lines.push(String::new());
}

fn metrics(view: &DashboardView, lines: &mut Vec<String>) {
    let basis = match view.metrics.basis {
        MetricsBasis::Raw => "before outlier clamping",
        MetricsBasis::Clamped => "after outlier clamping",
    };
    heading(lines, &format!("KEY METRICS ({})", basis));
    for metric in [
        &view.metrics.total_sales,
        &view.metrics.total_profit,
        &view.metrics.total_quantity,
    ] {
        lines.push(metric_line(metric));
    }
    lines.push(String::new());
}

fn metric_line(metric: &Metric) -> String {
    match &metric.column {
        Some(column) => format!("  {:<16} {:>16.2}  [{}]", metric.label, metric.value, column),
        None => format!("  {:<16} {:>16.2}  (no column detected)", metric.label, metric.value),
    }
}

fn data_points(points: &[DataPoint], lines: &mut Vec<String>) {
    if points.is_empty() {
        lines.push("  (no data)".to_string());
    }
    for point in points {
        lines.push(format!(
            "  {:<24} {:>14.2}",
            truncate_str(&point.label, 24),
            point.value
        ));
    }
}

fn row_line<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("  ");
    for cell in cells {
        line.push_str(&format!("{:<w$}", truncate_str(cell, CELL - 1), w = CELL));
    }
    line.trim_end().to_string()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn number(value: Option<f64>) -> String {
    value.map_or("-".to_string(), |v| format!("{:.2}", v))
}
