//! Tracing initialization shared by the vigil binaries.

use std::env;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// The log level defaults to INFO and follows `RUST_LOG`. Set
/// `RUST_LOG_FORMAT=json` for line-delimited JSON output, e.g. when runs
/// are driven by a scheduler that collects logs.
pub fn init() {
    let env_filter =
        EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();

    let log_layer = match env::var("RUST_LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
