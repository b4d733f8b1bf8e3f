//! Log output for binaries and tests embedding the engine.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "sombra_merge=info";

/// Installs a plain-text `tracing` subscriber on stderr.
///
/// `RUST_LOG` wins over `default_filter` when set. Only the first call has an effect, and
/// an already installed global subscriber is left in place.
pub fn init_tracing(default_filter: Option<&str>) {
    static INIT: Once = Once::new();
    let default_filter = default_filter.unwrap_or(DEFAULT_FILTER).to_owned();
    INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}
