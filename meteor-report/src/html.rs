use chrono::{DateTime, Utc};
use meteor_common::Result;
use meteor_engine::{ResultSet, Statistics};
use std::fmt::Write as _;
use std::io::Write;
use std::time::Duration;

use crate::io_error;

const STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .header {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 30px;
            border-radius: 10px;
            margin-bottom: 20px;
        }
        .header h1 { margin: 0 0 10px 0; }
        .header p { margin: 5px 0; opacity: 0.9; }
        .section {
            background: white;
            padding: 20px;
            margin-bottom: 20px;
            border-radius: 10px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .section h2 {
            margin-top: 0;
            color: #333;
            border-bottom: 2px solid #667eea;
            padding-bottom: 10px;
        }
        .stats-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 15px;
            margin-top: 20px;
        }
        .stat-card {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 8px;
            border-left: 4px solid #667eea;
        }
        .stat-label {
            font-size: 12px;
            color: #666;
            text-transform: uppercase;
            letter-spacing: 0.5px;
        }
        .stat-value { font-size: 24px; font-weight: bold; color: #333; margin-top: 5px; }
        .data-table { width: 100%; border-collapse: collapse; margin-top: 15px; }
        .data-table th, .data-table td { padding: 12px; text-align: left; border-bottom: 1px solid #e0e0e0; }
        .data-table th { background-color: #f8f9fa; font-weight: 600; color: #333; }
        .success { color: #28a745; }
        .error { color: #dc3545; }
"#;

/// Escape the five characters that matter in HTML text and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `12.35ms` style, two decimals.
pub fn format_latency(d: Duration) -> String {
    format!("{:.2}ms", d.as_secs_f64() * 1_000.0)
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn card(html: &mut String, label: &str, value: &str, class: &str) {
    let class = if class.is_empty() { "stat-value".to_string() } else { format!("stat-value {class}") };
    let _ = write!(
        html,
        "            <div class=\"stat-card\">\n                <div class=\"stat-label\">{}</div>\n                <div class=\"{class}\">{}</div>\n            </div>\n",
        escape(label),
        escape(value),
    );
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Build the self-contained HTML page.
pub fn render_html(results: &ResultSet, stats: &Statistics) -> String {
    let mut html = String::new();
    let target_list = results.targets.iter().map(|t| t.url.as_str()).collect::<Vec<_>>().join(", ");

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>Load Test Report</title>\n    <style>{STYLE}    </style>\n</head>\n<body>\n"
    );

    let _ = write!(
        html,
        "    <div class=\"header\">\n        <h1>Load Test Report</h1>\n        \
         <p><strong>Targets:</strong> {}</p>\n        \
         <p><strong>Test Duration:</strong> {:.2}s</p>\n        \
         <p><strong>Start Time:</strong> {}</p>\n        \
         <p><strong>End Time:</strong> {}</p>\n        \
         <p><strong>Stopped By:</strong> {}</p>\n    </div>\n",
        escape(&target_list),
        stats.total_duration.as_secs_f64(),
        format_time(&results.start_time),
        format_time(&results.end_time),
        results.stop_reason.as_name(),
    );

    html.push_str("    <div class=\"section\">\n        <h2>Configuration</h2>\n        <div class=\"stats-grid\">\n");
    card(&mut html, "Target RPS", &results.requests_per_second.to_string(), "");
    card(&mut html, "Concurrency", &results.concurrency.to_string(), "");
    card(&mut html, "Duration", &format!("{}s", results.duration_seconds), "");
    html.push_str("        </div>\n    </div>\n");

    html.push_str("    <div class=\"section\">\n        <h2>Summary</h2>\n        <div class=\"stats-grid\">\n");
    card(&mut html, "Total Requests", &stats.total_requests.to_string(), "");
    card(&mut html, "Success", &stats.success_requests.to_string(), "success");
    card(&mut html, "Failed", &stats.failed_requests.to_string(), "error");
    card(&mut html, "Actual RPS", &format!("{:.2}", stats.requests_per_sec), "");
    html.push_str("        </div>\n    </div>\n");

    html.push_str("    <div class=\"section\">\n        <h2>Response Time Statistics</h2>\n        <div class=\"stats-grid\">\n");
    let figures: [(&str, Option<Duration>); 6] = [
        ("Min", stats.latency.map(|l| l.min)),
        ("Average", stats.latency.map(|l| l.avg)),
        ("Median", stats.latency.map(|l| l.median)),
        ("95th Percentile", stats.latency.map(|l| l.p95)),
        ("99th Percentile", stats.latency.map(|l| l.p99)),
        ("Max", stats.latency.map(|l| l.max)),
    ];
    for (label, value) in figures {
        let text = value.map(format_latency).unwrap_or_else(|| "-".to_string());
        card(&mut html, label, &text, "");
    }
    html.push_str("        </div>\n    </div>\n");

    html.push_str(
        "    <div class=\"section\">\n        <h2>Status Code Distribution</h2>\n        \
         <table class=\"data-table\">\n            <tr><th>Status Code</th><th>Count</th><th>Percentage</th></tr>\n",
    );
    for (code, count) in &stats.status_code_counts {
        let class = if *code < 400 { "success" } else { "error" };
        let _ = writeln!(
            html,
            "            <tr><td class=\"{class}\">{code}</td><td>{count}</td><td>{:.2}%</td></tr>",
            percent(*count, stats.total_requests),
        );
    }
    if stats.failed_requests > 0 {
        let _ = writeln!(
            html,
            "            <tr><td class=\"error\">transport error</td><td>{}</td><td>{:.2}%</td></tr>",
            stats.failed_requests,
            percent(stats.failed_requests, stats.total_requests),
        );
    }
    html.push_str("        </table>\n    </div>\n");

    html.push_str(
        "    <div class=\"section\">\n        <h2>Targets</h2>\n        \
         <table class=\"data-table\">\n            <tr><th>URL</th><th>Weight</th><th>Requests</th></tr>\n",
    );
    for target in &results.targets {
        let count = stats.target_counts.get(&target.url).copied().unwrap_or(0);
        let _ = writeln!(
            html,
            "            <tr><td>{}</td><td>{:.3}</td><td>{count}</td></tr>",
            escape(&target.url),
            target.weight,
        );
    }
    html.push_str("        </table>\n    </div>\n</body>\n</html>\n");

    html
}

pub fn write_html(results: &ResultSet, stats: &Statistics, out: &mut impl Write) -> Result<()> {
    out.write_all(render_html(results, stats).as_bytes()).map_err(io_error)
}
