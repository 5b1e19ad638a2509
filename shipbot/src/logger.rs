//! Logging setup. Everything goes to stderr, keeping stdout free for the comment text.

use log::LevelFilter;

/// Map the number of `-v` flags to a level. Warnings are always shown.
pub fn level_for(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install an `env_logger` backend at the level chosen by `-v`. Does nothing if a
/// logger is already installed.
pub fn init(verbosity: u64) {
    let _ = env_logger::Builder::new()
        .filter_level(level_for(verbosity))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }

    #[test]
    fn second_init_is_ignored() {
        init(1);
        init(3);
    }
}
