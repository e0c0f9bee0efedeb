use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,folio=debug";

/// Installs the global subscriber. `RUST_LOG` wins over the default filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
