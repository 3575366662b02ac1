use std::env;

use log::LevelFilter;

const LOG_ENV: &str = "WDLSTAT_LOG";

fn level_from_str(s: &str) -> LevelFilter {
    match s.trim().to_lowercase().as_str() {
        "off" | "none" => LevelFilter::Off,
        "error" | "err" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

/// Installs the stderr logger. Verbosity comes from `WDLSTAT_LOG`
/// (`off`, `error`, `warn`, `info`, `debug`, `trace`), default `warn`.
pub fn init() {
    let level = env::var(LOG_ENV)
        .map(|s| level_from_str(&s))
        .unwrap_or(LevelFilter::Warn);

    // A second init (tests, embedding) keeps the first logger.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_aliases() {
        assert_eq!(level_from_str("err"), LevelFilter::Error);
        assert_eq!(level_from_str("WARNING"), LevelFilter::Warn);
        assert_eq!(level_from_str(" debug "), LevelFilter::Debug);
        assert_eq!(level_from_str("none"), LevelFilter::Off);
    }

    #[test]
    fn test_unknown_level_falls_back_to_warn() {
        assert_eq!(level_from_str("verbose"), LevelFilter::Warn);
        assert_eq!(level_from_str(""), LevelFilter::Warn);
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
