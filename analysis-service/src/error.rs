use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AnalysisError {
    /// A form field is missing, empty, unparsable or zero
    #[error("All fields are required!")]
    MissingFields,

    /// A threshold or period is negative, or the ticker is not a symbol
    #[error("Invalid input values!")]
    InvalidValues,

    #[error("Start date must be before end date!")]
    DateOrder,

    /// Range shorter than 45 days, or fewer than 20 bars
    #[error("Insufficient data for analysis!")]
    InsufficientData,

    #[error("No data found for the given ticker!")]
    NoData,

    /// The quote provider failed; the message is shown to the user as-is
    #[error("{0}")]
    Quotes(String),

    /// The uploaded price file is not a usable CSV
    #[error("Invalid price file: {0}")]
    PriceFile(String),

    #[error("Malformed form data: {0}")]
    Multipart(String),

    #[error("Trade log not found")]
    NotFound,

    /// Writing the trade log failed
    #[error("Failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Body of every error answer, the same shape the client decodes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// MultipartError is not Send, keep only its message
impl From<MultipartError> for AnalysisError {
    fn from(error: MultipartError) -> Self {
        AnalysisError::Multipart(error.to_string())
    }
}

impl AnalysisError {
    /// Returns a user-safe error message, without leaking file system details
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Io { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AnalysisError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::NotFound => StatusCode::NOT_FOUND,
            AnalysisError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AnalysisError::Io { .. } => log::error!("Internal service error: {}", self),
            AnalysisError::Quotes(_) => log::warn!("Quote provider error: {}", self),
            _ => log::debug!("Client error: {}", self),
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.user_message(),
        })
    }
}
