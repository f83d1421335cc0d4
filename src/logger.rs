use crate::environment::Environment;

use once_cell::sync::OnceCell;
use tracing_subscriber::{
    filter::{Directive, EnvFilter},
    fmt::time::UtcTime,
    FmtSubscriber,
};

pub struct LogGuard;

static LOGGER: OnceCell<LogGuard> = OnceCell::new();

fn directive(text: &str) -> Option<Directive> {
    text.parse().ok()
}

/// Initialize logger with custom format and verbosity.
///
/// `RUST_LOG` directives are honoured on top of the environment verbosity.
/// Subsequent calls are no-ops.
pub fn initialize_logger(environment: &Environment) {
    LOGGER.get_or_init(|| {
        let verbosity = environment.verbosity();

        let mut filter = EnvFilter::from_default_env();
        if let Some(directive) = directive(&verbosity.to_string().to_lowercase()) {
            filter = filter.add_directive(directive);
        }

        let subscriber = FmtSubscriber::builder()
            // All spans/events at or above the verbosity will be written to stderr,
            // leaving stdout to the JSON report.
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(UtcTime::rfc_3339())
            .finish();

        // A subscriber installed by the host process wins.
        let _ = tracing::subscriber::set_global_default(subscriber);

        LogGuard {}
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing::Level;

    #[test]
    #[serial]
    fn test_initialize_logger_twice() {
        let environment = Environment::default().with_verbosity(Level::DEBUG);
        initialize_logger(&environment);
        initialize_logger(&environment);
        assert!(LOGGER.get().is_some());
    }
}
