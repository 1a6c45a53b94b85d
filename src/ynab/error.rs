//! YNAB API error types with HTTP status classification.
//!
//! Every failure of a single remote call ends up as a [`YnabError`]. Lookups are
//! attempted once, so the classification is informational: it tells the
//! failure log whether trying again later would likely help.

/// Error from a YNAB API call.
#[derive(Debug, Clone)]
pub struct YnabError {
    /// The kind of error
    pub kind: YnabErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message (response body for HTTP failures)
    pub message: String,
}

impl YnabError {
    /// Create an error from a non-success HTTP status and its body.
    pub fn from_status(status_code: u16, message: String) -> Self {
        Self {
            kind: classify_http_status(status_code),
            status_code: Some(status_code),
            message,
        }
    }

    /// Create a client-side error for a request that was never sent.
    pub fn client_error(message: String) -> Self {
        Self {
            kind: YnabErrorKind::ClientError,
            status_code: None,
            message,
        }
    }

    /// Create a network error.
    pub fn network_error(message: String) -> Self {
        Self {
            kind: YnabErrorKind::NetworkError,
            status_code: None,
            message,
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: String) -> Self {
        Self {
            kind: YnabErrorKind::ParseError,
            status_code: None,
            message,
        }
    }

    /// Check if this error is transient (a later attempt might succeed).
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl std::fmt::Display for YnabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for YnabError {}

/// Classification of YNAB API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YnabErrorKind {
    /// Rate limited (429)
    RateLimited,
    /// Server error (5xx)
    ServerError,
    /// Client error (400, 401, 403, 404)
    ClientError,
    /// Connection failed or timed out
    NetworkError,
    /// Response body could not be decoded
    ParseError,
}

impl YnabErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            YnabErrorKind::RateLimited | YnabErrorKind::ServerError | YnabErrorKind::NetworkError
        )
    }
}

impl std::fmt::Display for YnabErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YnabErrorKind::RateLimited => write!(f, "Rate limited"),
            YnabErrorKind::ServerError => write!(f, "Server error"),
            YnabErrorKind::ClientError => write!(f, "Client error"),
            YnabErrorKind::NetworkError => write!(f, "Network error"),
            YnabErrorKind::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> YnabErrorKind {
    match status {
        429 => YnabErrorKind::RateLimited,
        400..=499 => YnabErrorKind::ClientError,
        _ => YnabErrorKind::ServerError,
    }
}
