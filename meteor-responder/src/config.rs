use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;

/// Base delay applied by `GET /` unless overridden.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(10);

/// Fixed delay of `GET /slow`.
pub const SLOW_DELAY: Duration = Duration::from_millis(500);

/// `--random-delay` varies the base delay by up to this fraction either way.
pub const DELAY_JITTER: f64 = 0.5;
