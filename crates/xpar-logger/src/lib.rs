use env_logger::Env;

/// Requested verbosity, set from the CLI's `--quiet`/`--verbose` flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Initialize the global logger using `env_logger`.
///
/// `RUST_LOG` always wins when set; otherwise `verbosity` picks the default
/// filter level.
pub fn init(verbosity: Verbosity) {
    let env = Env::default().default_filter_or(verbosity.default_filter());
    // Ignore errors if the logger was already initialized
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init();
}
