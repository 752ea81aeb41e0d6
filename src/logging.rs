use env_logger::Env;

/// Install the global logger. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "warn,post_flash_lib=debug"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
