use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber. `level` is an `EnvFilter` directive
/// such as `info` or `mobreducer=debug`; a malformed one falls back to `info`.
/// Calling this twice is harmless.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
