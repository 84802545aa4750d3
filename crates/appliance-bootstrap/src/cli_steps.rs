use std::sync::Arc;

use appliance_core::logging::{AggregateLogger, TerminalLogger, TracingLogger};
use appliance_core::wait::DotProgress;
use appliance_core::{CliEngine, Workflow};
use clap::ArgMatches;

use crate::cli_config;

/// Subcommands that map onto a single workflow step, or one of the two
/// fixed step sequences.
pub struct StepCommand;

impl StepCommand {
    pub fn new_cmds() -> Vec<clap::Command> {
        vec![
            clap::Command::new("build").about("build the factory image"),
            clap::Command::new("run").about("start the factory container"),
            clap::Command::new("shell")
                .about("open an interactive shell in the container to accept the license"),
            clap::Command::new("commit").about("commit the container as the base image"),
            clap::Command::new("tag").about("tag the base image as latest"),
            clap::Command::new("rm").about("force remove the factory container"),
            clap::Command::new("status").about("print the container state"),
            clap::Command::new("prepare").about("build, replace, run and wait for the container"),
            clap::Command::new("promote").about("commit and tag the accepted container"),
            clap::Command::new("config").about("print the resolved configuration as JSON"),
        ]
    }

    pub fn exec(name: &str, arg_matches: &ArgMatches) -> eyre::Result<()> {
        let cfg = cli_config::resolve(arg_matches)?;
        let mut engine = CliEngine::new(cfg.engine.as_str());
        if name == "build" {
            // stream build output to the terminal as well as the log
            engine = engine.with_logger(Arc::new(AggregateLogger {
                loggers: vec![
                    Arc::new(TracingLogger::default()),
                    Arc::new(TerminalLogger::new("build")),
                ],
            }));
        }
        let workflow = Workflow::new(&cfg, &engine);

        match name {
            "build" => workflow.build()?,
            "run" => {
                let id = workflow.run()?;
                println!("{id}");
            }
            "shell" => workflow.shell()?,
            "commit" => workflow.commit()?,
            "tag" => workflow.tag()?,
            "rm" => workflow.remove()?,
            "status" => {
                let state = workflow.status()?;
                println!("{}: {} (running: {})", cfg.container, state.status, state.running);
            }
            "prepare" => {
                workflow.prepare(DotProgress::stderr())?;
                println!(
                    "{} is listening on {}; accept the license, then run `appliance promote`",
                    cfg.container, cfg.port
                );
            }
            "promote" => {
                workflow.promote()?;
                println!("{}", cfg.base_latest_image());
            }
            "config" => println!("{}", serde_json::to_string_pretty(&cfg)?),
            other => eyre::bail!("unknown command {other}"),
        }

        Ok(())
    }
}
