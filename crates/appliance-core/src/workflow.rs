use crate::commands;
use crate::config::Config;
use crate::container::ContainerState;
use crate::engine::Engine;
use crate::errors::WorkflowError;
use crate::listener::ListenerCondition;
use crate::wait::{
    NoProgress, Outcome, Progress, ReadinessWaiter, Sleeper, ThreadSleeper, WaitSpec,
    WaitSpecBuilder,
};

/// The build, run, accept and promote steps for one appliance container.
pub struct Workflow<'a, E: Engine + ?Sized> {
    config: &'a Config,
    engine: &'a E,
}

impl<'a, E: Engine + ?Sized> Workflow<'a, E> {
    pub fn new(config: &'a Config, engine: &'a E) -> Self {
        Self { config, engine }
    }

    pub fn build(&self) -> Result<(), WorkflowError> {
        tracing::info!(image = %self.config.factory_image(), "building factory image");
        self.engine.output(&commands::build(self.config))?;

        Ok(())
    }

    /// Starts the factory container and returns its id.
    pub fn run(&self) -> Result<String, WorkflowError> {
        tracing::info!(
            container = self.config.container.as_str(),
            image = %self.config.factory_image(),
            "starting container"
        );
        let id = self.engine.output(&commands::run(self.config))?;

        Ok(id.trim().to_string())
    }

    pub fn remove(&self) -> Result<(), WorkflowError> {
        tracing::info!(container = self.config.container.as_str(), "removing container");
        self.engine.output(&commands::remove(self.config))?;

        Ok(())
    }

    /// Opens an interactive shell in the container for license acceptance.
    pub fn shell(&self) -> Result<(), WorkflowError> {
        self.engine.attach(&commands::shell(self.config))?;

        Ok(())
    }

    pub fn status(&self) -> Result<ContainerState, WorkflowError> {
        let output = self.engine.output(&commands::inspect(self.config))?;

        ContainerState::parse(&output).map_err(|source| WorkflowError::State {
            container: self.config.container.clone(),
            source,
        })
    }

    pub fn wait_spec(&self) -> Result<WaitSpec, WorkflowError> {
        Ok(WaitSpecBuilder::default()
            .target(self.config.container.as_str())
            .interval(self.config.interval)
            .timeout(self.config.timeout)
            .build()?)
    }

    pub fn wait(&self) -> Result<Outcome, WorkflowError> {
        self.wait_with(NoProgress)
    }

    /// Polls the container's listener table until the configured port is
    /// listening or the attempt budget runs out. A timeout is returned as an
    /// outcome, not an error.
    pub fn wait_with<P: Progress>(&self, progress: P) -> Result<Outcome, WorkflowError> {
        self.wait_using(ThreadSleeper, progress)
    }

    pub fn wait_using<S: Sleeper, P: Progress>(
        &self,
        sleeper: S,
        progress: P,
    ) -> Result<Outcome, WorkflowError> {
        let spec = self.wait_spec()?;
        let mut condition = ListenerCondition::new(
            self.engine,
            self.config.listener_command(),
            self.config.port,
        );

        Ok(ReadinessWaiter::new()
            .with_sleeper(sleeper)
            .with_progress(progress)
            .wait(&spec, &mut condition))
    }

    pub fn commit(&self) -> Result<(), WorkflowError> {
        tracing::info!(
            container = self.config.container.as_str(),
            image = %self.config.base_image(),
            "committing container"
        );
        self.engine.output(&commands::commit(self.config))?;

        Ok(())
    }

    pub fn tag(&self) -> Result<(), WorkflowError> {
        tracing::info!(
            source = %self.config.base_image(),
            alias = %self.config.base_latest_image(),
            "tagging base image"
        );
        self.engine.output(&commands::tag(self.config))?;

        Ok(())
    }

    /// Builds the factory image, replaces any previous container and waits
    /// until it listens on the configured port.
    pub fn prepare<P: Progress>(&self, progress: P) -> Result<Outcome, WorkflowError> {
        self.build()?;

        if let Err(e) = self.remove() {
            tracing::debug!(error = %e, "no previous container to remove");
        }

        self.run()?;

        match self.wait_with(progress)? {
            Outcome::TimedOut { attempts } => Err(WorkflowError::NotReady {
                container: self.config.container.clone(),
                port: self.config.port,
                attempts,
            }),
            ready => Ok(ready),
        }
    }

    /// Commits the accepted container as the base image and tags it latest.
    pub fn promote(&self) -> Result<(), WorkflowError> {
        self.commit()?;
        self.tag()?;

        Ok(())
    }
}
