use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoidsError {
    /// A run option is outside of the range the simulation can work with
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("agent {index} is out of range for a flock of {population}")]
    AgentOutOfRange { index: usize, population: usize },
}

impl BoidsError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        BoidsError::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}
