pub mod analyze_response;

pub use analyze_response::{AnalyzeResponse, Outcome};
