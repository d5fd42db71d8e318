//! HTTP transport for the validation exchange.
//!
//! The session talks to the CAS server through the [`ValidationTransport`]
//! trait so tests (and exotic deployments) can swap the wire out. The stock
//! implementation is a thin reqwest wrapper.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONNECTION, CONTENT_TYPE, PRAGMA};
use tracing::debug;

use cas_protocol::SOAP_ACTION;

use crate::error::CasError;

/// Header carrying the SOAP action for the SAML validation POST.
const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// Raw reply from the validation endpoint.
///
/// Non-2xx statuses are carried through rather than turned into errors:
/// CAS servers have been seen answering rejections with error statuses,
/// and the body is classified on its own merits either way.
#[derive(Debug, Clone)]
pub struct ValidationResponse {
    /// HTTP status code of the reply.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Delivery of one validation request to the CAS server.
#[async_trait]
pub trait ValidationTransport: Send + Sync {
    /// POSTs `body` to `validate_url` and returns the raw reply.
    async fn post_validation(
        &self,
        validate_url: &str,
        body: String,
    ) -> Result<ValidationResponse, CasError>;
}

/// Stock transport backed by a pooled reqwest client.
pub struct HttpValidationTransport {
    client: reqwest::Client,
}

impl HttpValidationTransport {
    /// Builds a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CasError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ValidationTransport for HttpValidationTransport {
    async fn post_validation(
        &self,
        validate_url: &str,
        body: String,
    ) -> Result<ValidationResponse, CasError> {
        let response = self
            .client
            .post(validate_url)
            .header(SOAP_ACTION_HEADER, SOAP_ACTION)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header(ACCEPT, "text/xml")
            .header(CONNECTION, "keep-alive")
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!(status, "validation endpoint replied");
        let body = response.text().await?;
        Ok(ValidationResponse { status, body })
    }
}
