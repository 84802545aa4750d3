use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::Serialize;

pub const DEFAULT_ENGINE: &str = "docker";
pub const DEFAULT_PORT: u16 = 2200;
pub const DEFAULT_TIMEOUT: u32 = 120;
pub const DEFAULT_INTERVAL_SECS: u64 = 1;
pub const LATEST_TAG: &str = "latest";

/// Everything a workflow step needs to know, resolved once before the first
/// step runs and passed by reference from then on.
#[derive(Builder, Clone, Debug, PartialEq, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Config {
    #[builder(setter(into), default = "DEFAULT_ENGINE.into()")]
    pub engine: String,
    #[builder(setter(into, strip_option), default)]
    pub registry: Option<String>,
    #[builder(setter(into), default = "\"appliance-factory\".into()")]
    pub factory_repository: String,
    #[builder(setter(into), default = "\"appliance-base\".into()")]
    pub base_repository: String,
    #[builder(setter(into), default = "\"dev\".into()")]
    pub tag: String,
    #[builder(setter(into), default = "\"appliance-factory\".into()")]
    pub container: String,
    #[builder(setter(into), default = "PathBuf::from(\".\")")]
    pub context: PathBuf,
    #[builder(setter(into, strip_option), default)]
    pub dockerfile: Option<PathBuf>,
    #[builder(default)]
    pub build_args: Vec<String>,
    #[builder(default = "vec![\"2200:2200\".into(), \"8443:8443\".into()]")]
    pub publish: Vec<String>,
    #[builder(default = "DEFAULT_PORT")]
    pub port: u16,
    #[builder(default = "DEFAULT_TIMEOUT")]
    pub timeout: u32,
    #[builder(default = "Duration::from_secs(DEFAULT_INTERVAL_SECS)")]
    pub interval: Duration,
    #[builder(setter(into), default = "\"netstat -tln\".into()")]
    pub listener_command: String,
    #[builder(setter(into), default = "\"/bin/sh\".into()")]
    pub shell: String,
    #[builder(default)]
    pub privileged: bool,
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.timeout == Some(0) {
            return Err("timeout must be at least one attempt".into());
        }
        if self.interval == Some(Duration::ZERO) {
            return Err("interval must be greater than zero".into());
        }
        if self.port == Some(0) {
            return Err("port must be greater than zero".into());
        }
        if let Some(args) = &self.build_args {
            if let Some(arg) = args.iter().find(|a| !a.contains('=')) {
                return Err(format!("build arg `{arg}` is not of the form KEY=VALUE"));
            }
        }

        Ok(())
    }
}

impl Config {
    /// The image built from the vendor sources, before license acceptance.
    pub fn factory_image(&self) -> String {
        self.image_ref(&self.factory_repository, &self.tag)
    }

    /// The committed image of the accepted container.
    pub fn base_image(&self) -> String {
        self.image_ref(&self.base_repository, &self.tag)
    }

    pub fn base_latest_image(&self) -> String {
        self.image_ref(&self.base_repository, LATEST_TAG)
    }

    pub fn listener_command(&self) -> Vec<String> {
        self.listener_command
            .split_whitespace()
            .map(String::from)
            .collect()
    }

    fn image_ref(&self, repository: &str, tag: &str) -> String {
        match self.registry.as_deref().map(|r| r.trim_end_matches('/')) {
            Some(registry) if !registry.is_empty() => format!("{registry}/{repository}:{tag}"),
            _ => format!("{repository}:{tag}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_reference_workflow() {
        let config = ConfigBuilder::default().build().unwrap();

        assert_eq!(config.engine, "docker");
        assert_eq!(config.port, 2200);
        assert_eq!(config.timeout, 120);
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.listener_command(), vec!["netstat", "-tln"]);
    }

    #[test]
    fn image_refs_without_registry() {
        let config = ConfigBuilder::default().tag("7.2").build().unwrap();

        assert_eq!(config.factory_image(), "appliance-factory:7.2");
        assert_eq!(config.base_image(), "appliance-base:7.2");
        assert_eq!(config.base_latest_image(), "appliance-base:latest");
    }

    #[test]
    fn image_refs_with_registry() {
        let config = ConfigBuilder::default()
            .registry("registry.example.com:5000/")
            .factory_repository("vendor/factory")
            .base_repository("vendor/base")
            .tag("7.2")
            .build()
            .unwrap();

        assert_eq!(
            config.factory_image(),
            "registry.example.com:5000/vendor/factory:7.2"
        );
        assert_eq!(
            config.base_latest_image(),
            "registry.example.com:5000/vendor/base:latest"
        );
    }

    #[test]
    fn empty_registry_is_ignored() {
        let config = ConfigBuilder::default().registry("").build().unwrap();

        assert_eq!(config.base_image(), "appliance-base:dev");
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ConfigBuilder::default().timeout(0).build().unwrap_err();

        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn rejects_zero_interval() {
        let res = ConfigBuilder::default().interval(Duration::ZERO).build();

        assert!(res.is_err());
    }

    #[test]
    fn rejects_malformed_build_arg() {
        let err = ConfigBuilder::default()
            .build_args(vec!["LICENSE".into()])
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("LICENSE"));
    }
}
