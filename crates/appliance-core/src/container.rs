use serde::{Deserialize, Serialize};

/// The `.State` object reported by `inspect`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ContainerState {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Running")]
    pub running: bool,
    #[serde(rename = "ExitCode", default)]
    pub exit_code: i64,
}

impl ContainerState {
    pub fn parse(output: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(output.trim())
    }
}
