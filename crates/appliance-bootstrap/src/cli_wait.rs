use appliance_core::wait::DotProgress;
use appliance_core::{CliEngine, Config, Outcome, Workflow};
use clap::{Arg, ArgMatches};

use crate::cli_config;

pub struct WaitCommand;

impl WaitCommand {
    pub fn new_cmd() -> clap::Command {
        clap::Command::new("wait")
            .about("poll until the configured port is listening inside the container")
            .arg(
                Arg::new("target")
                    .long("target")
                    .help("container to probe, defaults to --container"),
            )
            .arg(
                Arg::new("quiet")
                    .long("quiet")
                    .short('q')
                    .action(clap::ArgAction::SetTrue)
                    .help("do not print progress dots"),
            )
    }

    pub fn exec(arg_matches: &ArgMatches) -> eyre::Result<()> {
        let cfg = Self::config(arg_matches)?;
        let engine = CliEngine::new(cfg.engine.as_str());
        let workflow = Workflow::new(&cfg, &engine);

        let outcome = if arg_matches.get_flag("quiet") {
            workflow.wait()?
        } else {
            workflow.wait_with(DotProgress::stderr())?
        };

        match outcome {
            Outcome::Ready { attempts } => {
                tracing::debug!(attempts, "container ready");
                Ok(())
            }
            Outcome::TimedOut { attempts } => eyre::bail!(
                "port {} in {} was not listening after {} attempts",
                cfg.port,
                cfg.container,
                attempts
            ),
        }
    }

    fn config(arg_matches: &ArgMatches) -> eyre::Result<Config> {
        let cfg = cli_config::resolve(arg_matches)?;

        Ok(match arg_matches.get_one::<String>("target") {
            Some(target) => Config {
                container: target.clone(),
                ..cfg
            },
            None => cfg,
        })
    }
}
