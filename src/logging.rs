// src/logging.rs
// =============================================================================
// Sets up `env_logger` behind the `log` macros.
//
// - Default level is `warn`; each -v raises it for this crate only
// - RUST_LOG, when set, wins over -v completely
// - Everything goes to stderr, without timestamps or module paths
// =============================================================================

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes logging. Call once, before anything logs.
pub fn init_logging(verbose: u8) {
    let env = Env::default().filter_or("RUST_LOG", "warn");

    let mut builder = Builder::from_env(env);
    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if std::env::var("RUST_LOG").is_err() {
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("url_prober", level_for(verbose));
    }

    builder.init();
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
