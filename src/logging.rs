use tracing_subscriber::EnvFilter;

/// Verbosity requested on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    fn directive(self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => Some("error"),
            Verbosity::Normal => None,
            Verbosity::Verbose => Some("debug"),
            Verbosity::Trace => Some("trace"),
        }
    }
}

/// Filter precedence: `RUST_LOG`, then `-v`/`-q`, then the config's
/// `log_filter`, then `info`.
pub fn filter(verbosity: Verbosity, configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = verbosity.directive().or(configured).unwrap_or("info");
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr; stdout carries only the score.
pub fn init_logging(verbosity: Verbosity, configured: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity, configured))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        assert_eq!(Verbosity::Verbose.directive().or(Some("warn")), Some("debug"));
        assert_eq!(Verbosity::Normal.directive().or(Some("warn")), Some("warn"));
        assert_eq!(Verbosity::Quiet.directive(), Some("error"));
    }
}
