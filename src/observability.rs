//! Logging and observability helpers.

use std::fs;
use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "connhub.log";
const DEFAULT_FILTER: &str = "connhub=info";

/// Installs a global fmt subscriber.
///
/// With `log_dir` the output goes to a daily rolling file in that directory,
/// otherwise to stderr. Returns `false` if a global subscriber was already set.
pub fn init_tracing(log_dir: Option<&Path>) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::CLOSE);

    match log_dir {
        Some(dir) => {
            let _ = fs::create_dir_all(dir);
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            builder
                .with_writer(file_appender)
                .with_ansi(false)
                .try_init()
                .is_ok()
        }
        None => builder.with_writer(std::io::stderr).try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected_without_panicking() {
        let dir = tempfile::tempdir().expect("temp dir");
        let logs = dir.path().join("logs");

        let first = init_tracing(Some(&logs));
        let second = init_tracing(None);

        assert!(first, "file subscriber should claim the global slot");
        assert!(!second, "a second install must be rejected");
        assert!(logs.is_dir());
    }
}
