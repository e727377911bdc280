//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with either human-readable or JSON output.
//! Logs always go to stderr.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber.
///
/// `level` is any `EnvFilter` directive ("info", "debug", "capgate=trace").
/// `RUST_LOG` takes precedence when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section, with CLI overrides.
pub fn init_from_config(config: &capgate_core::Config, verbose: bool, json_logs: bool) {
    let (level, json_format) = resolve(&config.logging, verbose, json_logs);
    init(level, json_format);
}

fn resolve(
    logging: &capgate_core::config::LoggingConfig,
    verbose: bool,
    json_logs: bool,
) -> (&str, bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let json_format = json_logs || logging.format.eq_ignore_ascii_case("json");
    (level, json_format)
}
