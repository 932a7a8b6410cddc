use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum SubmitError {
    /// The request could not be sent or its body could not be read
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not the expected JSON object
    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response body is JSON `null`
    #[error("response body is null")]
    NullBody,

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// A file attached to the form could not be read
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A form field given on the command line is malformed
    #[error("invalid field `{0}`, expected name=value or name=@path")]
    InvalidField(String),
}

pub type Result<T, E = SubmitError> = std::result::Result<T, E>;
