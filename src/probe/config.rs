use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// How long every probe holds its process open after reporting, so that process placement can be
/// inspected from outside.
pub const DEFAULT_IDLE: Duration = Duration::from_secs(60);

/// Settings of a probe run. The binary never reads them from the command line or the
/// environment and always runs with [`ProbeConfig::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub idle: Duration,
    pub console_level: LevelFilter,
}

impl ProbeConfig {
    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    pub fn with_console_level(mut self, console_level: LevelFilter) -> Self {
        self.console_level = console_level;
        self
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            idle: DEFAULT_IDLE,
            console_level: LevelFilter::WARN,
        }
    }
}
