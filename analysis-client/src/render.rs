use crate::models::Outcome;
use askama::Template;
use std::sync::{Arc, Mutex, MutexGuard};

pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";

#[derive(Template)]
#[template(source = r#"<p style="color: red;">Error: {{ error }}</p>"#, ext = "html")]
struct ServerErrorTemplate<'a> {
    error: &'a str,
}

#[derive(Template)]
#[template(
    source = "<p>{{ message }}</p>\n<a href=\"{{ file }}\" download>Download Results</a>",
    ext = "html"
)]
struct SuccessTemplate<'a> {
    message: &'a str,
    file: &'a str,
}

#[derive(Template)]
#[template(source = r#"<p style="color: red;">{{ message }}</p>"#, ext = "html")]
struct GenericErrorTemplate {
    message: &'static str,
}

/// Content the result container can be replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// The server reported an error
    ServerError { error: String },
    /// The analysis finished and produced a downloadable file
    Success { message: String, file: String },
    /// Transport or decoding failed
    GenericError,
}

impl Fragment {
    pub fn is_error(&self) -> bool {
        !matches!(self, Fragment::Success { .. })
    }

    /// Render as HTML, escaping every interpolated value.
    pub fn to_html(&self) -> String {
        match self {
            Fragment::ServerError { error } => ServerErrorTemplate { error }.to_string(),
            Fragment::Success { message, file } => SuccessTemplate { message, file }.to_string(),
            Fragment::GenericError => GenericErrorTemplate {
                message: GENERIC_ERROR,
            }
            .to_string(),
        }
    }
}

impl From<Outcome> for Fragment {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Failed { error } => Fragment::ServerError { error },
            Outcome::Completed { message, file } => Fragment::Success { message, file },
        }
    }
}

/// Anything whose inner content can be swapped for a rendered fragment.
pub trait RenderTarget: Send + Sync {
    fn replace_contents(&self, html: String);
}

impl<T: RenderTarget + ?Sized> RenderTarget for Arc<T> {
    fn replace_contents(&self, html: String) {
        (**self).replace_contents(html)
    }
}

#[derive(Debug, Default)]
struct BufferState {
    html: String,
    replacements: usize,
}

/// In-memory result container. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct HtmlBuffer {
    state: Arc<Mutex<BufferState>>,
}

impl HtmlBuffer {
    pub fn new() -> HtmlBuffer {
        HtmlBuffer::default()
    }

    pub fn html(&self) -> String {
        self.lock().html.clone()
    }

    /// How many times the contents have been replaced.
    pub fn replacements(&self) -> usize {
        self.lock().replacements
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RenderTarget for HtmlBuffer {
    fn replace_contents(&self, html: String) {
        let mut state = self.lock();
        state.html = html;
        state.replacements += 1;
    }
}
