use thiserror::Error;

/// Errors raised while building a match.
///
/// Ticking never fails; these only surface from construction, where a bad
/// configuration or a missing body would make the simulation meaningless.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{0} body is not registered in the physics space")]
    MissingBody(&'static str),
}

pub type Result<T> = std::result::Result<T, SimError>;
