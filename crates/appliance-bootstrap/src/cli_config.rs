use std::path::PathBuf;
use std::time::Duration;

use appliance_core::config::{Config, ConfigBuilder, DEFAULT_ENGINE};
use clap::{value_parser, Arg, ArgAction, ArgMatches};

/// Global flags shared by every subcommand. Each one falls back to an
/// `APPLIANCE_*` environment variable.
pub fn args() -> Vec<Arg> {
    vec![
        Arg::new("engine")
            .long("engine")
            .env("APPLIANCE_ENGINE")
            .default_value(DEFAULT_ENGINE)
            .global(true)
            .help("container engine executable"),
        Arg::new("registry")
            .long("registry")
            .env("APPLIANCE_REGISTRY")
            .global(true),
        Arg::new("factory-repository")
            .long("factory-repository")
            .env("APPLIANCE_FACTORY_REPOSITORY")
            .global(true),
        Arg::new("base-repository")
            .long("base-repository")
            .env("APPLIANCE_BASE_REPOSITORY")
            .global(true),
        Arg::new("tag")
            .long("tag")
            .env("APPLIANCE_TAG")
            .global(true),
        Arg::new("container")
            .long("container")
            .env("APPLIANCE_CONTAINER")
            .global(true)
            .help("name of the factory container"),
        Arg::new("context")
            .long("context")
            .env("APPLIANCE_CONTEXT")
            .value_parser(value_parser!(PathBuf))
            .global(true),
        Arg::new("dockerfile")
            .long("dockerfile")
            .env("APPLIANCE_DOCKERFILE")
            .value_parser(value_parser!(PathBuf))
            .global(true),
        Arg::new("build-arg")
            .long("build-arg")
            .action(ArgAction::Append)
            .value_name("KEY=VALUE")
            .global(true),
        Arg::new("publish")
            .long("publish")
            .short('p')
            .env("APPLIANCE_PUBLISH")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .global(true),
        Arg::new("port")
            .long("port")
            .env("APPLIANCE_PORT")
            .value_parser(value_parser!(u16).range(1..))
            .default_value("2200")
            .global(true)
            .help("port that must be listening inside the container"),
        Arg::new("timeout")
            .long("timeout")
            .env("APPLIANCE_TIMEOUT")
            .value_parser(value_parser!(u32).range(1..))
            .default_value("120")
            .global(true)
            .help("maximum number of readiness checks"),
        Arg::new("interval")
            .long("interval")
            .env("APPLIANCE_INTERVAL")
            .value_parser(value_parser!(u64).range(1..))
            .default_value("1")
            .global(true)
            .help("seconds between readiness checks"),
        Arg::new("listener-command")
            .long("listener-command")
            .env("APPLIANCE_LISTENER_COMMAND")
            .global(true),
        Arg::new("shell")
            .long("shell")
            .env("APPLIANCE_SHELL")
            .global(true),
        Arg::new("privileged")
            .long("privileged")
            .env("APPLIANCE_PRIVILEGED")
            .action(ArgAction::SetTrue)
            .global(true),
    ]
}

pub fn resolve(matches: &ArgMatches) -> eyre::Result<Config> {
    let mut builder = ConfigBuilder::default();

    if let Some(engine) = matches.get_one::<String>("engine") {
        builder.engine(engine);
    }
    if let Some(registry) = matches.get_one::<String>("registry") {
        builder.registry(registry);
    }
    if let Some(repository) = matches.get_one::<String>("factory-repository") {
        builder.factory_repository(repository);
    }
    if let Some(repository) = matches.get_one::<String>("base-repository") {
        builder.base_repository(repository);
    }
    if let Some(tag) = matches.get_one::<String>("tag") {
        builder.tag(tag);
    }
    if let Some(container) = matches.get_one::<String>("container") {
        builder.container(container);
    }
    if let Some(context) = matches.get_one::<PathBuf>("context") {
        builder.context(context.clone());
    }
    if let Some(dockerfile) = matches.get_one::<PathBuf>("dockerfile") {
        builder.dockerfile(dockerfile.clone());
    }
    if let Some(build_args) = matches.get_many::<String>("build-arg") {
        builder.build_args(build_args.cloned().collect());
    }
    if let Some(publish) = matches.get_many::<String>("publish") {
        builder.publish(publish.cloned().collect());
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        builder.port(*port);
    }
    if let Some(timeout) = matches.get_one::<u32>("timeout") {
        builder.timeout(*timeout);
    }
    if let Some(interval) = matches.get_one::<u64>("interval") {
        builder.interval(Duration::from_secs(*interval));
    }
    if let Some(command) = matches.get_one::<String>("listener-command") {
        builder.listener_command(command);
    }
    if let Some(shell) = matches.get_one::<String>("shell") {
        builder.shell(shell);
    }
    builder.privileged(matches.get_flag("privileged"));

    let config = builder.build()?;
    tracing::debug!(?config, "resolved configuration");

    Ok(config)
}
