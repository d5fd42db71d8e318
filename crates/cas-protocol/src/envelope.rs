//! SAML 1.1 validation payload.
//!
//! The CAS validation endpoint expects a SOAP 1.1 envelope carrying a
//! `samlp:Request` whose single `AssertionArtifact` is the service ticket.
//! Everything but the ticket is boilerplate: the `RequestID` and
//! `IssueInstant` are the fixed placeholder values CAS deployments have
//! shipped for years, and servers do not check them on this flow.

/// Value of the `SOAPAction` header sent with the validation POST.
pub const SOAP_ACTION: &str = "http://www.oasis-open.org/committees/security";

// ============================================================================
// Envelope fragments
// ============================================================================

const SOAP_ENV_OPEN: &str =
    r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">"#;

const SOAP_BODY_OPEN: &str = "<SOAP-ENV:Header/><SOAP-ENV:Body>";

const SAMLP_REQUEST_OPEN: &str = r#"<samlp:Request xmlns:samlp="urn:oasis:names:tc:SAML:1.0:protocol" MajorVersion="1" MinorVersion="1" RequestID="_192.168.16.51.1024506224022" IssueInstant="2002-06-19T17:03:44.022Z">"#;

const ASSERTION_ARTIFACT_OPEN: &str = "<samlp:AssertionArtifact>";

const ASSERTION_ARTIFACT_CLOSE: &str = "</samlp:AssertionArtifact>";

const SAMLP_REQUEST_CLOSE: &str = "</samlp:Request>";

const SOAP_BODY_CLOSE: &str = "</SOAP-ENV:Body>";

const SOAP_ENV_CLOSE: &str = "</SOAP-ENV:Envelope>";

/// Builds the SOAP envelope posted to the validation endpoint.
///
/// The ticket is URL-encoded before being spliced into the
/// `AssertionArtifact` element, so tickets containing reserved characters
/// survive the trip verbatim.
pub fn build_saml_payload(ticket: &str) -> String {
    let mut payload = String::with_capacity(512);
    payload.push_str(SOAP_ENV_OPEN);
    payload.push_str(SOAP_BODY_OPEN);
    payload.push_str(SAMLP_REQUEST_OPEN);
    payload.push_str(ASSERTION_ARTIFACT_OPEN);
    payload.push_str(&urlencoding::encode(ticket));
    payload.push_str(ASSERTION_ARTIFACT_CLOSE);
    payload.push_str(SAMLP_REQUEST_CLOSE);
    payload.push_str(SOAP_BODY_CLOSE);
    payload.push_str(SOAP_ENV_CLOSE);
    payload
}
