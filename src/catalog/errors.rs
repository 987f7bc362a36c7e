//! Error types for the catalog scraper.

/// A session row fragment lacked something every row is expected to carry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("session row is missing its {field}")]
    MissingField { field: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("login was rejected for user '{username}'")]
    LoginRejected { username: String },
    #[error("page at {url} was not ready after {attempts} attempts")]
    NotReady {
        url: String,
        attempts: u32,
        #[source]
        last_error: Option<reqwest::Error>,
    },
    #[error("\"Get More Results\" on {url} has no followable link (href '{href}')")]
    UnfollowablePagination { url: String, href: String },
    #[error("catalog returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("invalid catalog URL")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}
