use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install the global logger, honouring `RUST_LOG` when set.
///
/// `verbose` lowers the default filter from info to debug. Safe to call more than once.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // Only fails when a logger is already installed.
    let _ = Builder::from_env(env).format_timestamp_millis().try_init();
}

/// Logger for tests: captured output, never panics on re-init.
pub fn init_for_tests() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
