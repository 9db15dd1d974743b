use meteor_common::{MeteorError, OutputFormat, Result};
use meteor_engine::{ResultSet, Statistics};
use std::io::Write;
use std::time::Duration;

pub mod html;
pub mod json;

/// Render a finished run in `format` to `out`.
pub fn render(format: OutputFormat, results: &ResultSet, stats: &Statistics, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => json::write_json(results, stats, out),
        OutputFormat::Html => html::write_html(results, stats, out),
    }
}

/// Whole milliseconds, truncated.
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn io_error(e: std::io::Error) -> MeteorError {
    MeteorError::Report(e.to_string())
}
