use regex::Regex;

use crate::engine::Engine;
use crate::wait::Condition;

/// Matches a listener table line for `port` in the LISTEN state.
///
/// The pattern is `^tcp.*:<port>.*LISTEN`, applied to each line of the
/// table. It covers both `tcp` and `tcp6` rows. Being a plain substring match
/// on the port, `:2200` also matches `:22000`.
#[derive(Clone, Debug)]
pub struct ListenerPattern {
    port: u16,
    regex: Regex,
}

impl ListenerPattern {
    pub fn new(port: u16) -> Self {
        let regex = Regex::new(&format!(r"^tcp.*:{port}.*LISTEN"))
            .expect("listener pattern is built from a number and must compile");

        Self { port, regex }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_listening(&self, table: &str) -> bool {
        table.lines().any(|line| self.regex.is_match(line))
    }
}

/// Runs the listener command inside the target and looks for the port.
///
/// Engine failures count as "not listening yet" for that attempt.
pub struct ListenerCondition<'a, E: Engine + ?Sized> {
    engine: &'a E,
    command: Vec<String>,
    pattern: ListenerPattern,
}

impl<'a, E: Engine + ?Sized> ListenerCondition<'a, E> {
    pub fn new(engine: &'a E, command: Vec<String>, port: u16) -> Self {
        Self {
            engine,
            command,
            pattern: ListenerPattern::new(port),
        }
    }
}

impl<'a, E: Engine + ?Sized> Condition for ListenerCondition<'a, E> {
    fn evaluate(&mut self, target: &str) -> bool {
        let args = crate::commands::exec(target, &self.command);
        match self.engine.output(&args) {
            Ok(table) => self.pattern.is_listening(&table),
            Err(e) => {
                tracing::debug!(
                    target_name = target,
                    port = self.pattern.port(),
                    error = %e,
                    "listener check failed"
                );
                false
            }
        }
    }
}
