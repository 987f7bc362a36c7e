//! Error types for schedule lookup and normalization.

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule reply has no {field}")]
    Missing { field: &'static str },
    #[error("unparseable {field} '{value}'")]
    MalformedTime {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("startTime '{value}' does not begin with a weekday name")]
    UnknownWeekday {
        value: String,
        #[source]
        source: chrono::ParseWeekdayError,
    },
    #[error("schedule endpoint returned {status} for session {session_id}")]
    Status {
        status: reqwest::StatusCode,
        session_id: String,
    },
    #[error("invalid schedule endpoint URL")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}
