use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log filter variable. Replies go to stdout, so logs are written to stderr.
pub(crate) const HERALD_LOG_ENV: &str = "HERALD_LOG";

pub(crate) fn herald_env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(HERALD_LOG_ENV)
        .from_env_lossy()
}

pub(crate) fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(herald_env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
