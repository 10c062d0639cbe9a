use log::LevelFilter;

/// Set up `env_logger` for a command-line tool
///
/// `quiet` keeps only warnings and errors, `verbose` adds debug output.
/// `RUST_LOG` overrides both.
pub fn init(quiet: bool, verbose: bool) {
    let _ = env_logger::Builder::new()
        .filter_level(level(quiet, verbose))
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .try_init();
}

fn level(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level() {
        assert_eq!(level(false, false), LevelFilter::Info);
        assert_eq!(level(false, true), LevelFilter::Debug);
        assert_eq!(level(true, true), LevelFilter::Warn);
    }
}
