/// Map a config level name onto a filter, falling back to `warn`.
pub fn level_filter(level: &str) -> log::LevelFilter {
    level.trim().parse().unwrap_or(log::LevelFilter::Warn)
}

/// Initialize env_logger once. RUST_LOG, when set, wins over the config level;
/// `verbose` raises the floor to debug.
pub fn init_logging(config_level: &str, verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug.max(level_filter(config_level))
    } else {
        level_filter(config_level)
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();

    log::debug!("logging initialized: level={level}");
}
