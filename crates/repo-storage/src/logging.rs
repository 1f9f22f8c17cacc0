use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global subscriber for storage logs.
///
/// Honours `RUST_LOG`, falling back to `default_directive` (for example
/// `"repo_storage=debug"`). Fails if a global subscriber is already set.
pub fn init_with(default_directive: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// [`init_with`] at `info`.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with("info")
}
