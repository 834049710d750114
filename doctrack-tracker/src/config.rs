//! Session configuration.

/// Default maximum number of operations handed to a sink in one call.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for a tracking session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name used in log output.
    pub name: String,
    /// Maximum operations per sink call when committing into a sink.
    pub batch_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}
