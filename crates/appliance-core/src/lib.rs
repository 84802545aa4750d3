pub mod commands;
pub mod config;
pub mod container;
pub mod engine;
pub mod errors;
pub mod listener;
pub mod logger;
pub mod logging;
pub mod wait;
pub mod workflow;

pub use crate::config::{Config, ConfigBuilder};
pub use crate::engine::{CliEngine, Engine};
pub use crate::wait::{Outcome, ReadinessWaiter, WaitSpec, WaitSpecBuilder};
pub use crate::workflow::Workflow;
