//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the tracing filter
pub const LOG_ENV: &str = "POKEDEX_LOG";

const FALLBACK_FILTER: &str = "pokedex=info";

/// Initialize logging to stderr.
///
/// `POKEDEX_LOG` wins, then the configured filter, then `pokedex=info`.
/// Calling this more than once is a no-op.
pub fn init_tracing(configured: Option<&str>) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(configured.unwrap_or(FALLBACK_FILTER)))
            .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
