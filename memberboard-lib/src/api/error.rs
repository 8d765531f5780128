use thiserror::Error;

/// Failures surfaced by the API client and the normalizer.
///
/// Only [`FetchError::TransientNetwork`] is ever retried. Everything else is
/// reported to the caller on first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No API key was supplied through the command line, environment, or secrets file.
    #[error("no Memberful API key is configured")]
    MissingApiKey,

    /// The API rejected the key (HTTP 401/403 or an authentication GraphQL error).
    #[error("the Memberful API rejected the API key: {0}")]
    Authentication(String),

    /// Connection failures, timeouts, 5xx and 429 responses.
    #[error("network error talking to the Memberful API: {0}")]
    TransientNetwork(String),

    /// The response did not have the shape we expect.
    #[error("malformed response from the Memberful API: {0}")]
    MalformedResponse(String),

    /// Any other non-success HTTP status.
    #[error("the Memberful API returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The HTTP client could not be constructed.
    #[error("unable to set up the HTTP client: {0}")]
    Setup(String),
}

impl FetchError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Whether the retry policy should try again after this failure.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_))
    }

    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::MissingApiKey)
    }
}

/// Render a reqwest error together with its source chain.
pub(crate) fn describe(error: &reqwest::Error) -> String {
    use core::error::Error as _;

    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }

    text
}
