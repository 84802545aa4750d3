use cli::Cli;

pub mod cli;
mod cli_config;
mod cli_steps;
mod cli_wait;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let args = std::env::args();
    let args = args.collect::<Vec<String>>();
    let args = args.iter().map(|s| s.as_str()).collect::<Vec<&str>>();

    Cli::new()?.execute(args.as_slice())?;

    Ok(())
}
