use std::io::Write;

use crate::logger::{DynLogger, Logger};
use tracing::Level;

/// Installs the fmt subscriber. Each verbosity step lowers the max level
/// from `INFO` to `DEBUG` and then `TRACE`.
pub fn init_logging(verbosity: u8) -> eyre::Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre::eyre!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Echoes engine output to stderr with a step prefix, leaving stdout to the
/// command's own result.
pub struct TerminalLogger {
    prefix: String,
}

impl TerminalLogger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn echo(&self, output: &str) -> eyre::Result<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{} | {}", self.prefix, output)?;

        Ok(())
    }
}

impl Logger for TerminalLogger {
    fn stdout(&self, output: &str) -> eyre::Result<()> {
        self.echo(output)
    }

    fn stderr(&self, output: &str) -> eyre::Result<()> {
        self.echo(output)
    }
}

#[derive(Default)]
pub struct TracingLogger {}

impl Logger for TracingLogger {
    fn stdout(&self, output: &str) -> eyre::Result<()> {
        tracing::debug!(output = output, "engine");

        Ok(())
    }

    fn stderr(&self, output: &str) -> eyre::Result<()> {
        tracing::debug!(output = output, stream = "stderr", "engine");

        Ok(())
    }
}

#[derive(Default)]
pub struct AggregateLogger {
    pub loggers: Vec<DynLogger>,
}

impl Logger for AggregateLogger {
    fn stdout(&self, output: &str) -> eyre::Result<()> {
        for logger in &self.loggers {
            logger.stdout(output)?;
        }

        Ok(())
    }

    fn stderr(&self, output: &str) -> eyre::Result<()> {
        for logger in &self.loggers {
            logger.stderr(output)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct CollectingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl Logger for CollectingLogger {
        fn stdout(&self, output: &str) -> eyre::Result<()> {
            self.lines.lock().unwrap().push(format!("out:{output}"));
            Ok(())
        }

        fn stderr(&self, output: &str) -> eyre::Result<()> {
            self.lines.lock().unwrap().push(format!("err:{output}"));
            Ok(())
        }
    }

    #[test]
    fn aggregate_logger_fans_out_to_every_logger() {
        let first = Arc::new(CollectingLogger::default());
        let second = Arc::new(CollectingLogger::default());
        let aggregate = AggregateLogger {
            loggers: vec![first.clone(), second.clone()],
        };

        aggregate.stdout("Step 1/4").unwrap();
        aggregate.stderr("warning").unwrap();

        let expected = vec!["out:Step 1/4".to_string(), "err:warning".to_string()];
        assert_eq!(*first.lines.lock().unwrap(), expected);
        assert_eq!(*second.lines.lock().unwrap(), expected);
    }
}
