//! Logging bootstrap for Strata
//!
//! Thin wrapper over `env_logger` so embedders get sensible defaults
//! without wiring their own builder. `RUST_LOG` always wins over the
//! defaults chosen here.

/// Initialize process logging.
///
/// Panics if a logger is already installed; embedders that may race on
/// initialization should use [`try_init`] instead.
pub fn init(debug: bool) {
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
}

/// Initialize process logging, ignoring an already-installed logger.
///
/// Intended for tests and library consumers that cannot know whether
/// the host application configured logging first.
pub fn try_init() {
    let _ = env_logger::try_init();
}
