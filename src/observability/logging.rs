use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging with a console layer and a daily-rotated JSON file in `logs/`.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "movebank.log");
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stdout);

    // RUST_LOG wins; otherwise info for our crate and warnings elsewhere
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("movebank_tracker=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // Keep the writer alive for the life of the process so logs are flushed
    std::mem::forget(_guard);
}
