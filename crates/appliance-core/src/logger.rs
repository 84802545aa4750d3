use std::sync::Arc;

/// Sink for the output lines of container engine commands.
pub trait Logger {
    fn stdout(&self, output: &str) -> eyre::Result<()>;
    fn stderr(&self, output: &str) -> eyre::Result<()>;
}

pub type DynLogger = Arc<dyn Logger + Send + Sync>;
