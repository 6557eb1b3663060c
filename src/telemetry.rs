//! Opt-in `tracing` setup for hosts embedding the timeline engine.
//!
//! Engine logs carry structured fields (`band_id`, `delta_px`, `velocity`)
//! and live under the `timeline_rs` target. Hosts with their own subscriber
//! never need this module.

/// Filter used when `RUST_LOG` is unset: warnings from everywhere plus
/// state transitions from the engine.
pub const DEFAULT_FILTER: &str = "warn,timeline_rs=debug";

/// Installs a compact fmt subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is off or a global subscriber
/// already exists.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_FILTER)
}

/// Same as [`init_default_tracing`] with a caller-chosen fallback filter.
/// `RUST_LOG` still takes precedence.
#[must_use]
pub fn init_tracing_with_filter(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
