use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,rolegate=debug,tower_http=debug";

/// Install a `tracing-subscriber` fmt subscriber driven by `RUST_LOG`.
///
/// Safe to call more than once: only the first call installs a subscriber.
/// Returns `true` when this call installed it.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init()
        .is_ok()
}

/// Returns a `TraceLayer` configured for HTTP request/response tracing.
///
/// Place it outside the role layer so rejected requests are traced too.
pub fn default_trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
