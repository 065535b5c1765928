//! Logging setup.
//!
//! The library itself only emits events: `tracing` from the view layer and
//! `log` from the config and preferences loaders. Binaries and tests install
//! a subscriber with [`init_tracing`]; `log` records are bridged into it.
//!
//! The filter is read from `RAGDASH_LOG` (e.g. `ragdash=debug`) and falls back
//! to the directive passed by the caller.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "RAGDASH_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
///
/// ```rust,ignore
/// ragdash::observability::init_tracing("info");
/// ```
pub fn init_tracing(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        // another subscriber may already be installed by the host application
        let _ = fmt().with_env_filter(filter).with_target(true).try_init();
    });
}

/// Span grouping the events of one collection view.
#[must_use]
pub fn view_span(entity: &str) -> Span {
    tracing::debug_span!("view", entity = entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing("warn");
        init_tracing("debug");
        let _entered = view_span("users").entered();
        tracing::debug!("inside view span");
    }
}
