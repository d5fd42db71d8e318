//! # cas-client
//!
//! Client-side CAS (Central Authentication Service) authentication for
//! applications that sit behind a CAS server: redirecting unauthenticated
//! requests to the login page, validating the service ticket CAS hands
//! back, and building logout URLs.
//!
//! The crate is host-framework-free. Glue code projects each inbound
//! request into an [`IncomingRequestView`] and hands it to a
//! [`CasSession`]:
//!
//! ```no_run
//! use cas_client::{AuthOutcome, CasConfig, CasSession, IncomingRequestView};
//!
//! # async fn handle() -> Result<(), cas_client::CasError> {
//! let config = CasConfig::new("https://cas.example.edu", "/cas")?;
//! let session = CasSession::new(config)?;
//!
//! let view = IncomingRequestView::new("/app/page?ticket=ST-1-abc")
//!     .with_query_param("ticket", "ST-1-abc")
//!     .with_forwarded_proto("https")
//!     .with_http_host("app.example.edu");
//!
//! match session.authenticate(&view).await? {
//!     AuthOutcome::Authenticated { principal, .. } => {
//!         // establish the application session for `principal`
//!     }
//!     AuthOutcome::RedirectToLogin { url } => {
//!         // answer with a 302 to `url`
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module layout
//!
//! - [`config`] - server coordinates and CAS endpoint URLs
//! - [`request`] - read-only view of the inbound request
//! - [`service_url`] - externally visible URL reconstruction
//! - [`transport`] - the validation POST, behind a trait
//! - [`session`] - the redirect/validate flow
//! - [`error`] - error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod request;
pub mod service_url;
pub mod session;
pub mod transport;

pub use config::CasConfig;
pub use error::CasError;
pub use request::IncomingRequestView;
pub use service_url::{canonical_service_url, is_https, resolve_client_host, strip_query_parameter};
pub use session::{AuthOutcome, CasSession, RedirectHandler, RedirectRecorder};
pub use transport::{HttpValidationTransport, ValidationResponse, ValidationTransport};

pub use cas_protocol::{
    AttributeMap, AttributeValue, FailureKind, ValidationFailure, ValidationOutcome,
};
