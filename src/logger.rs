//! Logger setup for nextkit.

/// Initializes `env_logger`, honouring `RUST_LOG` when it is set.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn })
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
