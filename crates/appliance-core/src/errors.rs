use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start container engine `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {}: {stderr}", describe_exit(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("failed to read container engine output")]
    Io(#[source] std::io::Error),
    #[error("could not acquire {0} from child process")]
    MissingPipe(&'static str),
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("container engine command failed")]
    Engine(#[from] EngineError),
    #[error("failed to parse state of container {container}")]
    State {
        container: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid wait parameters")]
    WaitSpec(#[from] crate::wait::WaitSpecBuilderError),
    #[error("port {port} in {container} was not listening after {attempts} attempts")]
    NotReady {
        container: String,
        port: u16,
        attempts: u32,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".into(),
    }
}
