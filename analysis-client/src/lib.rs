//! Client side of the breakout analyzer.
//!
//! A [`SubmissionHandler`] takes over a form's submit event, posts the form as
//! `multipart/form-data` to the analysis endpoint and replaces the contents of
//! a result container with either the outcome or an error message.

pub mod config;
pub mod error;
pub mod form;
pub mod handler;
pub mod models;
pub mod render;
pub mod transport;

pub use config::HandlerSettings;
pub use error::SubmitError;
pub use form::{FormData, FormField};
pub use handler::{SubmissionHandler, SubmitEvent, SubmitOutcome};
pub use models::{AnalyzeResponse, Outcome};
pub use render::{Fragment, HtmlBuffer, RenderTarget};
pub use transport::{HttpTransport, Transport};
