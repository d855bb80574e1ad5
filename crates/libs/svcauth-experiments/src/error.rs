use serde::{Deserialize, Serialize};

/// An experiment name that this build does not know about.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("unknown experiment: {name}")]
pub struct UnknownExperimentError {
    pub name: String,
}

impl UnknownExperimentError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
