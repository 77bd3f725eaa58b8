use thiserror::Error;

/// Reasons an interval cannot be constructed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError {
    #[error("interval low endpoint is above its high endpoint")]
    Inverted,

    #[error("an interval with coinciding endpoints must include both of them")]
    Empty,
}

/// Reasons an interval string form cannot be parsed back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIntervalError {
    #[error("missing opening '[' or '(': {0}")]
    MissingOpening(String),

    #[error("missing closing ']' or ')': {0}")]
    MissingClosing(String),

    #[error("missing ',' between endpoints: {0}")]
    MissingSeparator(String),

    #[error("can't parse endpoint: {0}")]
    Endpoint(String),

    #[error(transparent)]
    Invalid(#[from] IntervalError),
}
