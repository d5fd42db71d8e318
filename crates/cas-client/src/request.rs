//! Read-only snapshot of the inbound HTTP request.
//!
//! The client never touches a host framework's request type directly.
//! Whatever glue sits in front (axum handler, CGI shim, test harness)
//! projects the request into an [`IncomingRequestView`] once, and the
//! URL-derivation logic in [`crate::service_url`] works off that snapshot
//! alone.

/// Immutable projection of one inbound request.
///
/// `request_uri` is the raw path-and-query as received on the wire;
/// `query` holds the already-decoded parameters. Proxy headers and server
/// variables are optional and absent unless the glue provides them.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequestView {
    request_uri: String,
    query: Vec<(String, String)>,
    forwarded_host: Option<String>,
    forwarded_server: Option<String>,
    forwarded_port: Option<String>,
    forwarded_proto: Option<String>,
    forwarded_protocol: Option<String>,
    server_name: Option<String>,
    server_port: Option<String>,
    http_host: Option<String>,
    https: Option<String>,
}

impl IncomingRequestView {
    /// Starts a view from the raw request URI (path plus optional query
    /// string, exactly as received).
    pub fn new(request_uri: impl Into<String>) -> Self {
        Self {
            request_uri: request_uri.into(),
            ..Self::default()
        }
    }

    /// Adds one decoded query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets the `X-Forwarded-Host` header value.
    #[must_use]
    pub fn with_forwarded_host(mut self, value: impl Into<String>) -> Self {
        self.forwarded_host = Some(value.into());
        self
    }

    /// Sets the `X-Forwarded-Server` header value.
    #[must_use]
    pub fn with_forwarded_server(mut self, value: impl Into<String>) -> Self {
        self.forwarded_server = Some(value.into());
        self
    }

    /// Sets the `X-Forwarded-Port` header value.
    #[must_use]
    pub fn with_forwarded_port(mut self, value: impl Into<String>) -> Self {
        self.forwarded_port = Some(value.into());
        self
    }

    /// Sets the `X-Forwarded-Proto` header value.
    #[must_use]
    pub fn with_forwarded_proto(mut self, value: impl Into<String>) -> Self {
        self.forwarded_proto = Some(value.into());
        self
    }

    /// Sets the `X-Forwarded-Protocol` header value.
    #[must_use]
    pub fn with_forwarded_protocol(mut self, value: impl Into<String>) -> Self {
        self.forwarded_protocol = Some(value.into());
        self
    }

    /// Sets the `SERVER_NAME` server variable.
    #[must_use]
    pub fn with_server_name(mut self, value: impl Into<String>) -> Self {
        self.server_name = Some(value.into());
        self
    }

    /// Sets the `SERVER_PORT` server variable.
    #[must_use]
    pub fn with_server_port(mut self, value: impl Into<String>) -> Self {
        self.server_port = Some(value.into());
        self
    }

    /// Sets the `Host` header value.
    #[must_use]
    pub fn with_http_host(mut self, value: impl Into<String>) -> Self {
        self.http_host = Some(value.into());
        self
    }

    /// Sets the `HTTPS` server variable.
    #[must_use]
    pub fn with_https(mut self, value: impl Into<String>) -> Self {
        self.https = Some(value.into());
        self
    }

    /// Raw request URI as received.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// First value of the named query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The service ticket carried by this request, if any.
    pub fn ticket(&self) -> Option<&str> {
        self.query_param(crate::service_url::TICKET_PARAM)
    }

    pub(crate) fn forwarded_host(&self) -> Option<&str> {
        self.forwarded_host.as_deref()
    }

    pub(crate) fn forwarded_server(&self) -> Option<&str> {
        self.forwarded_server.as_deref()
    }

    pub(crate) fn forwarded_port(&self) -> Option<&str> {
        self.forwarded_port.as_deref()
    }

    pub(crate) fn forwarded_proto(&self) -> Option<&str> {
        self.forwarded_proto.as_deref()
    }

    pub(crate) fn forwarded_protocol(&self) -> Option<&str> {
        self.forwarded_protocol.as_deref()
    }

    pub(crate) fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub(crate) fn server_port(&self) -> Option<&str> {
        self.server_port.as_deref()
    }

    pub(crate) fn http_host(&self) -> Option<&str> {
        self.http_host.as_deref()
    }

    pub(crate) fn https(&self) -> Option<&str> {
        self.https.as_deref()
    }
}
