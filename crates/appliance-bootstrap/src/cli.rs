use clap::{Arg, ArgAction};

use crate::{cli_config, cli_steps::StepCommand, cli_wait::WaitCommand};

pub struct Cli {
    cmd: clap::Command,
}

impl Cli {
    pub fn new() -> eyre::Result<Self> {
        Ok(Self { cmd: Self::command() })
    }

    pub fn command() -> clap::Command {
        clap::Command::new("appliance")
            .about("Build, run and promote the appliance image")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg(
                Arg::new("verbose")
                    .long("verbose")
                    .short('v')
                    .action(ArgAction::Count)
                    .global(true),
            )
            .args(cli_config::args())
            .subcommands(StepCommand::new_cmds())
            .subcommand(WaitCommand::new_cmd())
    }

    pub fn execute(self, args: &[&str]) -> eyre::Result<()> {
        let matches = self.cmd.get_matches_from(args);

        appliance_core::logging::init_logging(matches.get_count("verbose"))?;

        match matches.subcommand() {
            Some(("wait", args)) => WaitCommand::exec(args)?,
            Some((name, args)) => StepCommand::exec(name, args)?,
            _ => eyre::bail!("command missing"),
        }

        Ok(())
    }
}
