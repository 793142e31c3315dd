use super::Report;
use crate::aggregate::Summary;
use crate::model::{Endpoints, QueryResult};
use crate::registry::{EndpointKind, PlatformSpec, Registry};
use anyhow::Result;
use chrono::DateTime;
use serde_json::Value;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct PlatformRow {
    #[tabled(rename = "Platform")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Price")]
    price: String,
}

pub fn print_cli_table(report: &Report) -> Result<()> {
    println!();
    println!("{}", render_table(report));
    Ok(())
}

/// Renders a report as per-platform rows followed by its summary values.
pub fn render_table(report: &Report) -> String {
    let mut out = String::new();

    if let Report::Summary(summary) = report {
        out.push_str(&render_summary(summary));
        return out;
    }

    let Some(result) = report.result() else {
        return out;
    };

    out.push_str(&render_endpoints(&result.endpoints));

    let metrics = summary_metrics(report);
    if !metrics.is_empty() {
        out.push('\n');
        out.push_str(&Table::new(metrics).with(Style::rounded()).to_string());
    }

    if let Some(status) = status_line(result) {
        out.push('\n');
        out.push_str(&status);
    }

    out
}

fn render_endpoints(endpoints: &Endpoints) -> String {
    if endpoints.is_empty() {
        return "No platforms returned data.".to_string();
    }

    // Platforms usually share fields; keep the first-seen column order.
    let mut columns: Vec<&str> = Vec::new();
    for (_, fields) in endpoints.iter() {
        for field in fields.keys() {
            if !columns.contains(&field.as_str()) {
                columns.push(field);
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(
        std::iter::once("Platform".to_string()).chain(columns.iter().map(|c| header(c))),
    );
    for (platform, fields) in endpoints.iter() {
        builder.push_record(
            std::iter::once(platform.to_string())
                .chain(columns.iter().map(|c| format_value(fields.get(*c)))),
        );
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn summary_metrics(report: &Report) -> Vec<MetricRow> {
    let row = |metric: &str, value: String| MetricRow {
        metric: metric.to_string(),
        value,
    };

    match report {
        Report::Downloads(r) => vec![row("Total downloads", r.total_downloads.to_string())],
        Report::Rating(r) => vec![
            row("Average rating", format!("{:.2}", r.average_rating)),
            row("Rating count", r.rating_count.to_string()),
        ],
        Report::Price(r) => vec![row(
            "Lowest price",
            format_price(r.lowest_price, &r.lowest_price_currency),
        )],
        Report::LatestVersion(r) => match (&r.latest_version, r.latest_version_published) {
            (Some(version), Some(published)) => vec![
                row("Latest version", version.clone()),
                row("Published", format_timestamp(published)),
            ],
            _ => vec![row("Latest version", "-".to_string())],
        },
        Report::Name(_) | Report::Summary(_) => Vec::new(),
    }
}

fn render_summary(summary: &Summary) -> String {
    let names: Vec<String> = summary
        .name
        .iter()
        .filter_map(|(_, fields)| fields.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    let mut unique_names: Vec<String> = Vec::new();
    for name in names {
        if !unique_names.contains(&name) {
            unique_names.push(name);
        }
    }

    let rows = vec![
        MetricRow {
            metric: "Name".to_string(),
            value: if unique_names.is_empty() {
                "-".to_string()
            } else {
                unique_names.join(" / ")
            },
        },
        MetricRow {
            metric: "Total downloads".to_string(),
            value: summary.total_downloads.to_string(),
        },
        MetricRow {
            metric: "Average rating".to_string(),
            value: format!(
                "{:.2} ({} ratings)",
                summary.average_rating, summary.rating_count
            ),
        },
        MetricRow {
            metric: "Latest version".to_string(),
            value: summary.latest_version.clone().unwrap_or_else(|| "-".to_string()),
        },
        MetricRow {
            metric: "Last updated".to_string(),
            value: summary
                .last_updated
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string()),
        },
        MetricRow {
            metric: "Lowest price".to_string(),
            value: format_price(summary.lowest_price, &summary.lowest_price_currency),
        },
    ];

    let mut out = Table::new(rows).with(Style::rounded()).to_string();
    out.push('\n');
    out.push_str(&render_endpoints(&summary.downloads));
    out
}

fn status_line(result: &QueryResult) -> Option<String> {
    if result.is_success() {
        return None;
    }
    Some(format!(
        "\x1b[31mError:\x1b[0m {}",
        result.message.as_deref().unwrap_or("query failed")
    ))
}

/// Prints the known platforms.
pub fn print_platforms(registry: &Registry) {
    println!("Available platforms:");
    println!();
    println!("{}", render_platforms(registry));
}

pub fn render_platforms(registry: &Registry) -> String {
    let supports = |platform: &PlatformSpec, kind: EndpointKind| {
        let declared = platform
            .endpoints
            .get(&kind)
            .is_some_and(|e| !e.returns.is_empty());
        let answer = if declared { "yes" } else { "no" };
        answer.to_string()
    };

    let rows: Vec<PlatformRow> = registry
        .platforms()
        .map(|p| PlatformRow {
            name: p.name.clone(),
            url: p.url.clone(),
            rating: supports(p, EndpointKind::Rating),
            price: supports(p, EndpointKind::Price),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn header(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn format_price(price: f64, currency: &str) -> String {
    if price > 0.0 {
        format!("{:.2} {}", price, currency)
    } else {
        "Free".to_string()
    }
}

/// Formats a Unix millisecond timestamp for display.
fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => timestamp.to_string(),
    }
}
