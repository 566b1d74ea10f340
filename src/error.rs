// Error types for the plot pipeline
use thiserror::Error;

/// Rejections decided locally, before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("axis variables required")]
    MissingAxis,
    #[error("start time is after end time ({estimate} datapoints)")]
    InvertedRange { estimate: i64 },
    #[error("no data requested")]
    EmptyRange,
    #[error("{estimate} datapoints requested, maximum is {maximum}")]
    TooManyPoints { estimate: i64, maximum: i64 },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to data endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("data endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode data response: {0}")]
    Decode(String),
    #[error("data endpoint reported an error: {0}")]
    Remote(String),
}

#[derive(Debug, Error)]
#[error("renderer rejected {operation}: {message}")]
pub struct RenderError {
    pub operation: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("unknown control '{0}'")]
    UnknownControl(String),
    #[error("control '{id}' expects a {expected} value")]
    WrongKind { id: String, expected: &'static str },
    #[error("'{0}' is not a #rrggbb colour")]
    InvalidColour(String),
    #[error("'{0}' is not a YYYY-MM-DDTHH:MM time")]
    InvalidTime(String),
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file is malformed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not write preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Any failure that terminates a load/apply/switch chain.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Control(#[from] ControlError),
}
