//! Session orchestration.
//!
//! [`CasSession`] drives one inbound request through the CAS dance: a
//! request without a ticket is redirected to the CAS login page, a request
//! carrying one has the ticket validated against the server. Redirect
//! delivery is behind the [`RedirectHandler`] trait because the mechanics
//! differ per host (an HTTP 302, a rendered interstitial, a test recorder).

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cas_protocol::{build_saml_payload, parse_service_response, AttributeMap, ValidationOutcome};

use crate::config::CasConfig;
use crate::error::CasError;
use crate::request::IncomingRequestView;
use crate::service_url::canonical_service_url;
use crate::transport::{HttpValidationTransport, ValidationTransport};

/// What one pass through [`CasSession::authenticate`] decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthOutcome {
    /// The CAS server vouched for the ticket.
    Authenticated {
        /// Principal named by the server.
        principal: String,
        /// Attributes released alongside the principal.
        attributes: AttributeMap,
        /// Canonical service URL with the ticket stripped. Hosts usually
        /// redirect the browser here so the ticket disappears from the
        /// visible URL.
        service_url: String,
    },
    /// No ticket was present; the login redirect has been dispatched.
    RedirectToLogin {
        /// Login URL the user agent was sent to.
        url: String,
    },
}

/// Delivery of a redirect to the user agent.
#[async_trait]
pub trait RedirectHandler: Send + Sync {
    /// Sends the user agent to `url`.
    async fn dispatch(&self, url: &str) -> Result<(), CasError>;
}

/// Default handler: logs the target and remembers the most recent one.
///
/// Hosts that issue real HTTP redirects install their own handler via
/// [`CasSession::with_redirect_handler`]; this one keeps the flow
/// observable when nothing better is wired up.
#[derive(Debug, Default)]
pub struct RedirectRecorder {
    target: Mutex<Option<String>>,
}

impl RedirectRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the most recently dispatched target, clearing it.
    pub fn take_target(&self) -> Option<String> {
        self.target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl RedirectHandler for RedirectRecorder {
    async fn dispatch(&self, url: &str) -> Result<(), CasError> {
        info!(%url, "redirect requested");
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(url.to_owned());
        Ok(())
    }
}

/// Client-side CAS session for one configured server.
///
/// Cheap to clone; the transport and redirect handler are shared.
#[derive(Clone)]
pub struct CasSession {
    config: CasConfig,
    transport: Arc<dyn ValidationTransport>,
    redirect: Arc<dyn RedirectHandler>,
}

impl CasSession {
    /// Creates a session with the stock HTTP transport and the recording
    /// redirect handler.
    pub fn new(config: CasConfig) -> Result<Self, CasError> {
        let transport = HttpValidationTransport::new(config.timeout())?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
            redirect: Arc::new(RedirectRecorder::new()),
        })
    }

    /// Replaces the wire transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn ValidationTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the redirect handler.
    #[must_use]
    pub fn with_redirect_handler(mut self, handler: Arc<dyn RedirectHandler>) -> Self {
        self.redirect = handler;
        self
    }

    /// Configuration this session was built from.
    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    /// Drives one inbound request through the CAS flow.
    ///
    /// A request carrying a ticket is validated; success yields
    /// [`AuthOutcome::Authenticated`] and rejection an error. A request
    /// without a ticket gets the login redirect dispatched and yields
    /// [`AuthOutcome::RedirectToLogin`].
    pub async fn authenticate(
        &self,
        view: &IncomingRequestView,
    ) -> Result<AuthOutcome, CasError> {
        match view.ticket() {
            Some(ticket) => self.validate_ticket(view, ticket).await,
            None => self.redirect_to_login(view).await,
        }
    }

    /// Sends the user agent to the CAS logout page, optionally forwarding
    /// them to `service` afterwards. Returns the dispatched URL.
    pub async fn logout(&self, service: Option<&str>) -> Result<String, CasError> {
        let url = self.config.logout_url(service);
        debug!(%url, "dispatching CAS logout");
        self.redirect.dispatch(&url).await?;
        Ok(url)
    }

    async fn validate_ticket(
        &self,
        view: &IncomingRequestView,
        ticket: &str,
    ) -> Result<AuthOutcome, CasError> {
        let service_url = canonical_service_url(view);
        let validate_url = self.config.service_validate_url(&service_url, ticket);
        debug!(%service_url, "validating service ticket");

        let payload = build_saml_payload(ticket);
        let response = self.transport.post_validation(&validate_url, payload).await?;

        match parse_service_response(&response.body) {
            ValidationOutcome::Success {
                principal,
                attributes,
            } => {
                info!(%principal, attribute_count = attributes.len(), "service ticket validated");
                Ok(AuthOutcome::Authenticated {
                    principal,
                    attributes,
                    service_url,
                })
            }
            ValidationOutcome::Failure(failure) => {
                warn!(
                    kind = ?failure.kind,
                    reason = %failure.reason,
                    status = response.status,
                    "service ticket rejected"
                );
                Err(CasError::TicketValidation(failure))
            }
        }
    }

    async fn redirect_to_login(
        &self,
        view: &IncomingRequestView,
    ) -> Result<AuthOutcome, CasError> {
        let service_url = canonical_service_url(view);
        let url = self.config.login_url(&service_url);
        debug!(%url, "no service ticket, redirecting to CAS login");
        self.redirect.dispatch(&url).await?;
        Ok(AuthOutcome::RedirectToLogin { url })
    }
}
