use std::env;

/// Path every form is posted to, relative to the transport's origin.
pub const ANALYZE_ROUTE: &str = "/analyze";

// Evaluate env vars only once
lazy_static::lazy_static! {
    pub static ref ANALYZE_BASE_URL: String =
        env::var("ANALYZE_BASE_URL").unwrap_or_else(|_| String::from("http://127.0.0.1:5000"));
    pub static ref DISCARD_STALE: bool = env::var("DISCARD_STALE")
        .map(|value| parse_flag(&value))
        .unwrap_or(true);
}

/// Settings a [`SubmissionHandler`](crate::handler::SubmissionHandler) is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Drop responses that settle after a newer submission has started.
    pub discard_stale: bool,
}

impl HandlerSettings {
    pub fn from_env() -> HandlerSettings {
        HandlerSettings {
            discard_stale: *DISCARD_STALE,
        }
    }
}

impl Default for HandlerSettings {
    fn default() -> Self {
        HandlerSettings {
            discard_stale: true,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
