//! Server side of the breakout analyzer: the `/analyze` endpoint that turns a
//! submitted form into a CSV trade log, and the route serving those logs.

pub mod breakout;
pub mod config;
pub mod error;
pub mod form;
pub mod quotes;
pub mod report;
pub mod routes;

pub use error::AnalysisError;
pub use routes::{register, AppState};
