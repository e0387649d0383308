use std::io;

use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use crate::probe::config::ProbeConfig;

/// Installs the console logger for the current thread. Log output goes to stderr, stdout is
/// reserved for the report line. Logging stays active until the returned guard is dropped.
pub fn init_logging(config: &ProbeConfig) -> DefaultGuard {
    let collector = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(io::stderr)
            .with_ansi(false)
            .with_filter(config.console_level),
    );
    tracing::subscriber::set_default(collector)
}
