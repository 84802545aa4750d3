//! Bounded polling until a target reports ready.
//!
//! The budget counts attempts, not wall-clock time. Each failed attempt is
//! followed by one sleep of `interval` unless it was the last one, and the
//! time spent evaluating the condition is never subtracted from the budget.

use std::io::Write;
use std::time::Duration;

use derive_builder::Builder;

/// A readiness check, evaluated fresh on every attempt.
pub trait Condition {
    fn evaluate(&mut self, target: &str) -> bool;
}

impl<F> Condition for F
where
    F: FnMut(&str) -> bool,
{
    fn evaluate(&mut self, target: &str) -> bool {
        self(target)
    }
}

pub trait Sleeper {
    fn sleep(&mut self, interval: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Cosmetic feedback for attempts that did not succeed.
pub trait Progress {
    fn pending(&mut self, target: &str, attempt: u32, budget: u32);
    fn finished(&mut self, _outcome: &Outcome) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn pending(&mut self, _target: &str, _attempt: u32, _budget: u32) {}
}

/// Prints one dot per failed attempt and a newline once the wait ends.
pub struct DotProgress<W: Write> {
    writer: W,
    dirty: bool,
}

impl<W: Write> DotProgress<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            dirty: false,
        }
    }
}

impl DotProgress<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> Progress for DotProgress<W> {
    fn pending(&mut self, _target: &str, _attempt: u32, _budget: u32) {
        // progress output is best effort
        let _ = self.writer.write_all(b".").and_then(|_| self.writer.flush());
        self.dirty = true;
    }

    fn finished(&mut self, _outcome: &Outcome) {
        if self.dirty {
            let _ = self.writer.write_all(b"\n").and_then(|_| self.writer.flush());
            self.dirty = false;
        }
    }
}

#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct WaitSpec {
    #[builder(setter(into))]
    pub target: String,
    #[builder(default = "Duration::from_secs(1)")]
    pub interval: Duration,
    /// Maximum number of condition evaluations.
    #[builder(default = "120")]
    pub timeout: u32,
}

impl WaitSpecBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.timeout == Some(0) {
            return Err("timeout must be a positive number of attempts".into());
        }
        if self.interval == Some(Duration::ZERO) {
            return Err("interval must be greater than zero".into());
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ready { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match *self {
            Outcome::Ready { attempts } | Outcome::TimedOut { attempts } => attempts,
        }
    }
}

pub struct ReadinessWaiter<S = ThreadSleeper, P = NoProgress> {
    sleeper: S,
    progress: P,
}

impl Default for ReadinessWaiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessWaiter {
    pub fn new() -> Self {
        Self {
            sleeper: ThreadSleeper,
            progress: NoProgress,
        }
    }
}

impl<S: Sleeper, P: Progress> ReadinessWaiter<S, P> {
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> ReadinessWaiter<T, P> {
        ReadinessWaiter {
            sleeper,
            progress: self.progress,
        }
    }

    pub fn with_progress<T: Progress>(self, progress: T) -> ReadinessWaiter<S, T> {
        ReadinessWaiter {
            sleeper: self.sleeper,
            progress,
        }
    }

    pub fn wait<C: Condition + ?Sized>(&mut self, spec: &WaitSpec, condition: &mut C) -> Outcome {
        tracing::info!(
            target_name = spec.target.as_str(),
            timeout = spec.timeout,
            interval_ms = spec.interval.as_millis() as u64,
            "waiting for readiness"
        );

        let mut outcome = Outcome::TimedOut {
            attempts: spec.timeout,
        };

        for i in 0..spec.timeout {
            let attempt = i + 1;
            if condition.evaluate(&spec.target) {
                outcome = Outcome::Ready { attempts: attempt };
                break;
            }

            tracing::debug!(
                target_name = spec.target.as_str(),
                attempt,
                budget = spec.timeout,
                "not ready"
            );
            self.progress.pending(&spec.target, attempt, spec.timeout);

            if attempt < spec.timeout {
                self.sleeper.sleep(spec.interval);
            }
        }

        self.progress.finished(&outcome);
        match outcome {
            Outcome::Ready { attempts } => {
                tracing::info!(target_name = spec.target.as_str(), attempts, "ready")
            }
            Outcome::TimedOut { attempts } => {
                tracing::warn!(target_name = spec.target.as_str(), attempts, "timed out")
            }
        }

        outcome
    }
}
