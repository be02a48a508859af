//! Log setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Directive applied when `RUST_LOG` is unset
pub const DEFAULT_DIRECTIVE: &str = "streamswitch=info";

/// Install the global fmt subscriber
///
/// Filtering comes from `RUST_LOG`; without it, only this crate's `info`
/// and above are shown.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match std::env::var_os(EnvFilter::DEFAULT_ENV) {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::try_new(DEFAULT_DIRECTIVE)?,
    };

    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}
