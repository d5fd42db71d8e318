//! `serviceResponse` classification.
//!
//! Validation responses are classified totally: every possible body maps to
//! either a success or a categorized failure, and parsing itself never
//! returns an error. Transport problems are a different axis and live in
//! the client crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::attributes::{extract_attributes, AttributeMap};
use crate::xml::parse_document;

/// Failure reason used when the server gives nothing better, matching the
/// protocol's long-standing wording.
const TICKET_NOT_VALIDATED: &str = "ticket not validated";

/// Outcome of classifying one validation response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// The server vouched for the ticket.
    Success {
        /// Authenticated principal, from the `user` element.
        principal: String,
        /// Attributes released alongside the principal.
        attributes: AttributeMap,
    },
    /// The server rejected the ticket, or the body was not a recognizable
    /// validation response.
    Failure(ValidationFailure),
}

impl ValidationOutcome {
    /// True for [`ValidationOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::Failure(ValidationFailure {
            kind,
            reason: reason.into(),
        })
    }
}

/// A categorized validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Which way the response failed.
    pub kind: FailureKind,
    /// Human-readable reason, taken from the server where it offered one.
    pub reason: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Failure categories a validation response can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The body was not well-formed XML, or its root element was not a
    /// `serviceResponse`.
    MalformedResponse,
    /// The server answered with an explicit `authenticationFailure`.
    AuthenticationFailure,
    /// An `authenticationSuccess` element arrived without a usable `user`
    /// child.
    MissingPrincipal,
    /// A well-formed `serviceResponse` with neither a success nor a failure
    /// element.
    UnrecognizedResponse,
}

/// Classifies a raw validation response body.
///
/// The branches are ordered and mutually exclusive; notably a document
/// containing both an `authenticationFailure` and an
/// `authenticationSuccess` element counts as a failure.
pub fn parse_service_response(raw: &str) -> ValidationOutcome {
    let root = match parse_document(raw) {
        Ok(root) => root,
        Err(err) => {
            warn!(error = %err, "validation response is not well-formed XML");
            return ValidationOutcome::failure(FailureKind::MalformedResponse, TICKET_NOT_VALIDATED);
        }
    };

    if root.local_name() != "serviceResponse" {
        warn!(root = root.local_name(), "unexpected root element in validation response");
        return ValidationOutcome::failure(FailureKind::MalformedResponse, TICKET_NOT_VALIDATED);
    }

    if let Some(failure) = root.descendant("authenticationFailure") {
        let reason = failure_reason(failure.attribute("code"), failure.text());
        return ValidationOutcome::failure(FailureKind::AuthenticationFailure, reason);
    }

    if let Some(success) = root.descendant("authenticationSuccess") {
        let principal = success
            .child("user")
            .map(|user| user.text().to_owned())
            .unwrap_or_default();
        if principal.is_empty() {
            return ValidationOutcome::failure(FailureKind::MissingPrincipal, TICKET_NOT_VALIDATED);
        }
        let attributes = extract_attributes(success);
        return ValidationOutcome::Success {
            principal,
            attributes,
        };
    }

    ValidationOutcome::failure(FailureKind::UnrecognizedResponse, TICKET_NOT_VALIDATED)
}

/// Combines the optional `code` attribute and element text of an
/// `authenticationFailure` into one reason string.
fn failure_reason(code: Option<&str>, text: &str) -> String {
    match (code, text) {
        (Some(code), text) if !text.is_empty() => format!("{code}: {text}"),
        (Some(code), _) => code.to_owned(),
        (None, text) if !text.is_empty() => text.to_owned(),
        (None, _) => TICKET_NOT_VALIDATED.to_owned(),
    }
}
