use crate::config::LogLevel;

/// Install `env_logger` at `level`.
///
/// `RUST_LOG` still overrides per-module filters. When a logger is already
/// installed the global max level is only ever raised, never lowered.
pub fn init(level: LogLevel) {
    let filter = level.filter();
    let installed = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .try_init()
        .is_ok();

    if !installed && log::max_level() < filter {
        log::set_max_level(filter);
    }
}
