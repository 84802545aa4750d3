use std::{
    io::{BufRead, BufReader, Read},
    process::{Command, Stdio},
    sync::Arc,
};

use crate::errors::EngineError;
use crate::logger::DynLogger;
use crate::logging::TracingLogger;

/// The external container engine CLI.
pub trait Engine {
    /// Runs the engine with `args` and returns its captured stdout.
    fn output(&self, args: &[String]) -> Result<String, EngineError>;

    /// Runs the engine with `args` attached to the current terminal.
    fn attach(&self, args: &[String]) -> Result<(), EngineError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn output(&self, args: &[String]) -> Result<String, EngineError> {
        (**self).output(args)
    }

    fn attach(&self, args: &[String]) -> Result<(), EngineError> {
        (**self).attach(args)
    }
}

#[derive(Clone)]
pub struct CliEngine {
    program: String,
    logger: DynLogger,
}

impl CliEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            logger: Arc::new(TracingLogger::default()),
        }
    }

    pub fn with_logger(mut self, logger: DynLogger) -> Self {
        self.logger = logger;
        self
    }

    fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl Engine for CliEngine {
    fn output(&self, args: &[String]) -> Result<String, EngineError> {
        let command = self.command_line(args);
        tracing::debug!(command = command.as_str(), "running");

        let mut proc = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = proc
            .stdout
            .take()
            .ok_or(EngineError::MissingPipe("stdout"))?;
        let stderr = proc
            .stderr
            .take()
            .ok_or(EngineError::MissingPipe("stderr"))?;

        let (captured, errors) = std::thread::scope(|s| {
            let stderr_logger = self.logger.clone();
            let errors = s.spawn(move || {
                drain_lines(stderr, |line| {
                    if let Err(e) = stderr_logger.stderr(line) {
                        tracing::trace!(error = %e, "logger rejected stderr line");
                    }
                })
            });

            let captured = drain_lines(stdout, |line| {
                if let Err(e) = self.logger.stdout(line) {
                    tracing::trace!(error = %e, "logger rejected stdout line");
                }
            });

            let errors = errors
                .join()
                .unwrap_or_else(|_| Ok(String::from("stderr reader panicked")));

            (captured, errors)
        });

        let status = proc.wait().map_err(EngineError::Io)?;
        let captured = captured.map_err(EngineError::Io)?;
        let errors = errors.map_err(EngineError::Io)?;

        if !status.success() {
            return Err(EngineError::Failed {
                command,
                code: status.code(),
                stderr: errors.trim().to_string(),
            });
        }

        Ok(captured)
    }

    fn attach(&self, args: &[String]) -> Result<(), EngineError> {
        let command = self.command_line(args);
        tracing::info!(command = command.as_str(), "attaching");

        let status = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            return Err(EngineError::Failed {
                command,
                code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }
}

/// Reads `reader` to the end line by line, handing each line to `on_line`
/// and returning everything read. Bytes that are not UTF-8 are replaced
/// rather than failing the whole command.
fn drain_lines<R: Read>(reader: R, mut on_line: impl FnMut(&str)) -> std::io::Result<String> {
    let mut reader = BufReader::new(reader);
    let mut collected = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        on_line(line);
        collected.push_str(line);
        collected.push('\n');
    }

    Ok(collected)
}

#[cfg(all(test, unix))]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn captures_stdout() {
        let engine = CliEngine::new("echo");

        let out = engine.output(&args(&["build", "-t", "factory:dev", "."])).unwrap();

        assert_eq!(out, "build -t factory:dev .\n");
    }

    #[test]
    fn invalid_utf8_output_is_decoded_lossily() {
        let engine = CliEngine::new("sh");

        let out = engine
            .output(&args(&[
                "-c",
                "printf 'tcp 0 0 0.0.0.0:2200 0.0.0.0:* LISTEN\\n\\377\\n'; printf '\\376\\n' >&2",
            ]))
            .unwrap();

        assert_eq!(out, "tcp 0 0 0.0.0.0:2200 0.0.0.0:* LISTEN\n\u{FFFD}\n");
        assert!(crate::listener::ListenerPattern::new(2200).is_listening(&out));
    }

    #[test]
    fn drain_lines_keeps_unterminated_last_line() {
        let mut seen = Vec::new();

        let out = drain_lines(&b"first\r\nsecond"[..], |line| seen.push(line.to_string())).unwrap();

        assert_eq!(seen, vec!["first", "second"]);
        assert_eq!(out, "first\nsecond\n");
    }

    #[test]
    fn non_zero_exit_is_failed() {
        let engine = CliEngine::new("false");

        match engine.output(&args(&["rm", "-f", "factory"])) {
            Err(EngineError::Failed { command, code, .. }) => {
                assert_eq!(command, "false rm -f factory");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let engine = CliEngine::new("appliance-engine-that-does-not-exist");

        let err = engine.output(&args(&["ps"])).unwrap_err();

        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[test]
    fn stderr_is_reported_on_failure() {
        let engine = CliEngine::new("sh");

        let err = engine
            .output(&args(&["-c", "echo no such container >&2; exit 3"]))
            .unwrap_err();

        match err {
            EngineError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "no such container");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
