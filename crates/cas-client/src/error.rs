//! Client-side error types.

use cas_protocol::ValidationFailure;
use thiserror::Error;

/// Errors surfaced by the authentication client.
///
/// Transport problems and ticket rejections are deliberately distinct
/// variants: a host application typically retries or reports the former and
/// denies access on the latter.
#[derive(Debug, Error)]
pub enum CasError {
    /// The client was constructed with unusable settings.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A CAS URL could not be assembled into something parseable.
    #[error("invalid CAS URL: {0}")]
    InvalidUrl(String),

    /// The validation request could not reach the server or produced no
    /// readable response.
    #[error("CAS server unreachable: {source}")]
    Transport {
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },

    /// The validation request ran past the configured timeout.
    #[error("CAS validation request timed out")]
    Timeout,

    /// The server answered, but did not vouch for the ticket.
    #[error("ticket validation failed: {0}")]
    TicketValidation(ValidationFailure),
}

impl CasError {
    /// True for failures of the network rather than of the ticket.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout)
    }

    /// The categorized failure, when the server rejected the ticket.
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::TicketValidation(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CasError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport { source: err }
        }
    }
}
