//! # cas-protocol
//!
//! Wire-level building blocks of the CAS (Central Authentication Service)
//! ticket validation protocol: the SAML 1.1 payload posted to the server,
//! and the parsing of the `serviceResponse` document that comes back.
//!
//! This crate is deliberately transport-free. It turns a service ticket
//! into a request body and a raw response body into a [`ValidationOutcome`];
//! issuing the HTTP request is the caller's business (see the companion
//! `cas-client` crate).
//!
//! ## Module layout
//!
//! - [`envelope`] - SOAP/SAML request payload construction
//! - [`xml`] - minimal owned XML tree used by the response parser
//! - [`response`] - `serviceResponse` classification
//! - [`attributes`] - extraction of user attributes from a success element

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attributes;
pub mod envelope;
pub mod response;
pub mod xml;

pub use attributes::{extract_attributes, AttributeMap, AttributeValue};
pub use envelope::{build_saml_payload, SOAP_ACTION};
pub use response::{parse_service_response, FailureKind, ValidationFailure, ValidationOutcome};
pub use xml::{parse_document, XmlNode, XmlParseError};
