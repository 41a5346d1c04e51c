use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A BKT parameter outside the open interval (0, 1)
    #[error("invalid configuration: {name} = {value} (must lie strictly between 0 and 1)")]
    Configuration { name: &'static str, value: f64 },

    /// A question that cannot be presented at all
    #[error("malformed question: {0}")]
    MalformedQuestion(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
