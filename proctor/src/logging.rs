use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stdout.
///
/// The filter comes from `RUST_LOG` and falls back to `default_filter`.
///
/// ```
/// proctor::init_logging("info");
/// ```
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(filter).try_init();
}
