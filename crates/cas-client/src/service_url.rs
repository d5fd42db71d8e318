//! Service URL reconstruction.
//!
//! CAS requires the `service` sent to the login page and the one sent to
//! the validation endpoint to be byte-identical, so the externally visible
//! URL of the current request is rebuilt here from proxy headers and server
//! variables instead of being taken from framework state. The ticket
//! parameter is stripped because the service URL must describe the request
//! as it looked before CAS appended the ticket.

use crate::request::IncomingRequestView;

/// Query parameter CAS uses to deliver the service ticket.
pub const TICKET_PARAM: &str = "ticket";

/// Decides whether the original client connection used HTTPS.
///
/// `X-Forwarded-Proto` is authoritative when present, even when empty or
/// carrying junk: a proxy that sets the header at all is trusted to set it
/// to `https` when it terminated TLS. `X-Forwarded-Protocol` is the older
/// spelling, and the `HTTPS` server variable is the CGI-era fallback
/// (truthy unless empty or `off` in any case).
pub fn is_https(view: &IncomingRequestView) -> bool {
    if let Some(proto) = view.forwarded_proto() {
        return proto == "https";
    }
    if let Some(proto) = view.forwarded_protocol() {
        return proto == "https";
    }
    match view.https() {
        Some(value) => !value.is_empty() && !value.eq_ignore_ascii_case("off"),
        None => false,
    }
}

/// Resolves the host (and, when non-default, port) the client addressed.
///
/// Sources in priority order: first entry of `X-Forwarded-Host`, then
/// `X-Forwarded-Server`, then `SERVER_NAME`, then the `Host` header. A port
/// is appended only when the chosen host does not already carry one and the
/// effective port differs from the scheme default.
pub fn resolve_client_host(view: &IncomingRequestView) -> String {
    let mut host = if let Some(forwarded) = view.forwarded_host() {
        first_entry(forwarded)
    } else if let Some(server) = view.forwarded_server() {
        server.to_owned()
    } else {
        match view.server_name() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => view.http_host().unwrap_or_default().to_owned(),
        }
    };

    if !host.contains(':') {
        if let Some(port) = effective_port(view) {
            let default_port = if is_https(view) { "443" } else { "80" };
            if !port.is_empty() && port != default_port {
                host.push(':');
                host.push_str(&port);
            }
        }
    }

    host
}

/// Rebuilds the full externally visible URL of the current request, with
/// the ticket parameter removed.
pub fn canonical_service_url(view: &IncomingRequestView) -> String {
    let scheme = if is_https(view) { "https" } else { "http" };
    let host = resolve_client_host(view);

    let request_uri = view.request_uri();
    let (path, query) = match request_uri.split_once('?') {
        Some((path, query)) => (path, query),
        None => (request_uri, ""),
    };

    let mut url = format!("{scheme}://{host}{path}");
    let remaining = strip_query_parameter(TICKET_PARAM, query);
    if !remaining.is_empty() {
        url.push('?');
        url.push_str(&remaining);
    }
    url
}

/// Removes every `name=value` (or bare `name`) token from a raw query
/// string, leaving the other tokens byte-for-byte untouched.
pub fn strip_query_parameter(name: &str, query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }
    let prefix = format!("{name}=");
    query
        .split('&')
        .filter(|token| *token != name && !token.starts_with(prefix.as_str()))
        .collect::<Vec<_>>()
        .join("&")
}

/// Port in effect for this request: first entry of `X-Forwarded-Port`,
/// else `SERVER_PORT`.
fn effective_port(view: &IncomingRequestView) -> Option<String> {
    view.forwarded_port()
        .map(first_entry)
        .or_else(|| view.server_port().map(str::to_owned))
}

/// First comma-separated entry, trimmed. Proxy chains append their values,
/// and the first one describes the original client hop.
fn first_entry(header: &str) -> String {
    header
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_owned()
}
