//! Common test utilities and fixtures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use cas_client::{CasConfig, CasSession, IncomingRequestView, RedirectRecorder};

/// Everything the mock validation endpoint saw on its most recent call.
#[derive(Debug, Clone, Default)]
pub struct ValidationRecord {
    /// Decoded `service` query parameter.
    pub service: Option<String>,
    /// Decoded `ticket` query parameter.
    pub ticket: Option<String>,
    /// Decoded `renew` query parameter.
    pub renew: Option<String>,
    /// `SOAPAction` request header.
    pub soap_action: Option<String>,
    /// Raw request body.
    pub body: String,
}

#[derive(Clone, Default)]
struct MockState {
    last: Arc<Mutex<Option<ValidationRecord>>>,
}

/// Test environment running a mock CAS server and a session wired to it.
pub struct TestEnv {
    /// Base URL of the mock CAS server.
    pub base_url: String,
    /// Session under test, pointed at the mock server.
    pub session: CasSession,
    /// Redirect recorder installed on the session.
    pub redirects: Arc<RedirectRecorder>,
    last: Arc<Mutex<Option<ValidationRecord>>>,
}

impl TestEnv {
    /// Creates a test environment with default configuration.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(|config| config).await
    }

    /// Creates a test environment, letting the caller adjust the session
    /// configuration first.
    pub async fn with_config(
        tweak: impl FnOnce(CasConfig) -> CasConfig,
    ) -> anyhow::Result<Self> {
        // Initialize tracing for tests
        let _ = tracing_subscriber::fmt()
            .with_env_filter("cas_client=debug,cas_protocol=debug")
            .try_init();

        let state = MockState::default();
        let last = Arc::clone(&state.last);

        let app = Router::new()
            .route("/cas/serviceValidate", post(service_validate))
            .with_state(state);

        // Bind an ephemeral port for the mock server
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://127.0.0.1:{}", listener.local_addr()?.port());

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("mock CAS server error: {}", e);
            }
        });

        let config = tweak(CasConfig::new(&base_url, "/cas")?);
        let redirects = Arc::new(RedirectRecorder::new());
        let session =
            CasSession::new(config)?.with_redirect_handler(Arc::clone(&redirects) as _);

        Ok(Self {
            base_url,
            session,
            redirects,
            last,
        })
    }

    /// Most recent validation call the mock server answered, if any.
    pub fn last_validation(&self) -> Option<ValidationRecord> {
        self.last.lock().unwrap().clone()
    }
}

/// Builds the view of a request to the protected application at
/// `https://app.example.edu`, deriving decoded query parameters from the
/// request URI.
pub fn app_view(path_and_query: &str) -> IncomingRequestView {
    let mut view = IncomingRequestView::new(path_and_query)
        .with_forwarded_proto("https")
        .with_http_host("app.example.edu");

    if let Some((_, query)) = path_and_query.split_once('?') {
        for token in query.split('&') {
            let (name, value) = token.split_once('=').unwrap_or((token, ""));
            view = view.with_query_param(
                urlencoding::decode(name).expect("decodable name"),
                urlencoding::decode(value).expect("decodable value"),
            );
        }
    }
    view
}

/// Extracts and decodes the `service` query parameter from a CAS URL.
pub fn service_param(url: &str) -> String {
    let (_, after) = url.split_once("service=").expect("URL carries a service param");
    let encoded = after.split('&').next().unwrap_or(after);
    urlencoding::decode(encoded)
        .expect("service param decodes")
        .into_owned()
}

// ============================================================================
// Mock CAS server
// ============================================================================

async fn service_validate(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let record = ValidationRecord {
        service: params.get("service").cloned(),
        ticket: params.get("ticket").cloned(),
        renew: params.get("renew").cloned(),
        soap_action: headers
            .get("SOAPAction")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body: body.clone(),
    };
    *state.last.lock().unwrap() = Some(record);

    let ticket = params.get("ticket").map(String::as_str).unwrap_or_default();
    let response = if !body.contains("<samlp:AssertionArtifact>") {
        failure_body("INVALID_REQUEST", "request is not a SAML artifact lookup")
    } else {
        canned_response(ticket)
    };

    ([(CONTENT_TYPE, "text/xml")], response)
}

fn canned_response(ticket: &str) -> String {
    match ticket {
        "ST-ok" => success_body("alice", ""),
        "ST-attrs" => success_body(
            "alice",
            "<cas:attributes>\
               <cas:mail>alice@example.edu</cas:mail>\
               <cas:memberOf>staff</cas:memberOf>\
               <cas:memberOf>admins</cas:memberOf>\
             </cas:attributes>",
        ),
        "ST-flat" => "<cas:serviceResponse xmlns:cas=\"http://www.yale.edu/tp/cas\">\
               <cas:authenticationSuccess>\
                 <cas:user>bob</cas:user>\
                 <cas:mail>bob@example.edu</cas:mail>\
               </cas:authenticationSuccess>\
             </cas:serviceResponse>"
            .to_owned(),
        "ST-pairs" => "<serviceResponse>\
               <authenticationSuccess>\
                 <user>carol</user>\
                 <attribute name=\"mail\" value=\"carol@example.edu\"/>\
                 <attribute name=\"memberOf\" value=\"faculty\"/>\
               </authenticationSuccess>\
             </serviceResponse>"
            .to_owned(),
        "ST-nouser" => "<cas:serviceResponse xmlns:cas=\"http://www.yale.edu/tp/cas\">\
               <cas:authenticationSuccess/>\
             </cas:serviceResponse>"
            .to_owned(),
        "ST-garbage" => "<html><body>502 Bad Gateway</body></html>".to_owned(),
        other => failure_body("INVALID_TICKET", &format!("Ticket {other} not recognized")),
    }
}

fn success_body(user: &str, extra: &str) -> String {
    format!(
        "<cas:serviceResponse xmlns:cas=\"http://www.yale.edu/tp/cas\">\
           <cas:authenticationSuccess>\
             <cas:user>{user}</cas:user>\
             {extra}\
           </cas:authenticationSuccess>\
         </cas:serviceResponse>"
    )
}

fn failure_body(code: &str, message: &str) -> String {
    format!(
        "<cas:serviceResponse xmlns:cas=\"http://www.yale.edu/tp/cas\">\
           <cas:authenticationFailure code=\"{code}\">{message}</cas:authenticationFailure>\
         </cas:serviceResponse>"
    )
}
