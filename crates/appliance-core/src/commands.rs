//! Argument vectors for the container engine CLI.

use crate::config::Config;

pub fn build(config: &Config) -> Vec<String> {
    let mut args: Vec<String> = vec!["build".into(), "-t".into(), config.factory_image()];
    if let Some(dockerfile) = &config.dockerfile {
        args.extend(["-f".into(), dockerfile.to_string_lossy().to_string()]);
    }
    for build_arg in &config.build_args {
        args.extend(["--build-arg".into(), build_arg.clone()]);
    }
    args.push(config.context.to_string_lossy().to_string());

    args
}

pub fn run(config: &Config) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "run".into(),
        "-d".into(),
        "--name".into(),
        config.container.clone(),
    ];
    if config.privileged {
        args.push("--privileged".into());
    }
    for publish in &config.publish {
        args.extend(["-p".into(), publish.clone()]);
    }
    args.push(config.factory_image());

    args
}

pub fn exec(container: &str, command: &[String]) -> Vec<String> {
    let mut args: Vec<String> = vec!["exec".into(), container.into()];
    args.extend(command.iter().cloned());

    args
}

pub fn shell(config: &Config) -> Vec<String> {
    vec![
        "exec".into(),
        "-it".into(),
        config.container.clone(),
        config.shell.clone(),
    ]
}

pub fn commit(config: &Config) -> Vec<String> {
    vec![
        "commit".into(),
        config.container.clone(),
        config.base_image(),
    ]
}

pub fn tag(config: &Config) -> Vec<String> {
    vec![
        "tag".into(),
        config.base_image(),
        config.base_latest_image(),
    ]
}

pub fn remove(config: &Config) -> Vec<String> {
    vec!["rm".into(), "-f".into(), config.container.clone()]
}

pub fn inspect(config: &Config) -> Vec<String> {
    vec![
        "inspect".into(),
        "--format".into(),
        "{{json .State}}".into(),
        config.container.clone(),
    ]
}
