//! Client configuration and CAS endpoint URL construction.

use std::time::Duration;

use url::Url;

use crate::error::CasError;

/// Environment variable naming the CAS server base URL.
pub const ENV_SERVER_URL: &str = "CAS_SERVER_URL";
/// Environment variable naming the path prefix of the CAS endpoints.
pub const ENV_VALIDATION_PATH: &str = "CAS_VALIDATION_PATH";
/// Environment variable overriding the validation timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "CAS_TIMEOUT_SECS";
/// Environment variable forcing fresh authentication (`renew=true`).
pub const ENV_RENEW: &str = "CAS_RENEW";

const DEFAULT_VALIDATION_PATH: &str = "/cas";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings for one CAS server relationship.
///
/// URLs are assembled by plain concatenation of
/// `{server_base_url}{validation_path}` with the endpoint suffix; neither
/// part is slash-normalized, so the two must be written to join cleanly
/// (`https://cas.example.edu` + `/cas`).
#[derive(Debug, Clone)]
pub struct CasConfig {
    server_base_url: String,
    validation_path: String,
    timeout: Duration,
    renew: bool,
}

impl CasConfig {
    /// Creates a configuration from a server base URL and endpoint path
    /// prefix.
    ///
    /// Both parts must be non-empty, and the base URL must be absolute
    /// with an `http` or `https` scheme; anything else is refused here
    /// rather than at request time.
    pub fn new(
        server_base_url: impl Into<String>,
        validation_path: impl Into<String>,
    ) -> Result<Self, CasError> {
        let server_base_url = server_base_url.into();
        if server_base_url.is_empty() {
            return Err(CasError::Config("server base URL is empty".into()));
        }
        let parsed = Url::parse(&server_base_url)
            .map_err(|err| CasError::InvalidUrl(format!("{server_base_url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CasError::InvalidUrl(format!(
                "{server_base_url}: expected an http or https URL"
            )));
        }
        let validation_path = validation_path.into();
        if validation_path.is_empty() {
            return Err(CasError::Config("validation path is empty".into()));
        }

        Ok(Self {
            server_base_url,
            validation_path,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            renew: false,
        })
    }

    /// Reads configuration from the environment, consulting a `.env` file
    /// when one is present.
    ///
    /// [`ENV_SERVER_URL`] is required; the rest fall back to defaults
    /// (`/cas` prefix, 10 second timeout, `renew` off).
    pub fn from_env() -> Result<Self, CasError> {
        let _ = dotenvy::dotenv();

        let server_base_url = std::env::var(ENV_SERVER_URL)
            .map_err(|_| CasError::Config(format!("{ENV_SERVER_URL} is not set")))?;
        let validation_path = std::env::var(ENV_VALIDATION_PATH)
            .unwrap_or_else(|_| DEFAULT_VALIDATION_PATH.to_owned());

        let timeout_secs = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let renew = std::env::var(ENV_RENEW)
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self::new(server_base_url, validation_path)?
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_renew(renew))
    }

    /// Overrides the validation request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Requires the CAS server to re-authenticate the user instead of
    /// honoring an existing single sign-on session.
    #[must_use]
    pub fn with_renew(mut self, renew: bool) -> Self {
        self.renew = renew;
        self
    }

    /// Configured server base URL.
    pub fn server_base_url(&self) -> &str {
        &self.server_base_url
    }

    /// Configured endpoint path prefix.
    pub fn validation_path(&self) -> &str {
        &self.validation_path
    }

    /// Timeout applied to the validation POST.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether `renew=true` is sent on login and validation.
    pub fn renew(&self) -> bool {
        self.renew
    }

    /// URL of the CAS login page for the given service.
    pub fn login_url(&self, service: &str) -> String {
        let mut url = format!(
            "{}{}/login?service={}",
            self.server_base_url,
            self.validation_path,
            urlencoding::encode(service)
        );
        if self.renew {
            url.push_str("&renew=true");
        }
        url
    }

    /// URL of the CAS logout page, optionally sending the user somewhere
    /// afterwards.
    pub fn logout_url(&self, service: Option<&str>) -> String {
        let mut url = format!("{}{}/logout", self.server_base_url, self.validation_path);
        if let Some(service) = service {
            url.push_str("?service=");
            url.push_str(&urlencoding::encode(service));
        }
        url
    }

    /// URL of the validation endpoint for the given service and ticket.
    pub fn service_validate_url(&self, service: &str, ticket: &str) -> String {
        let mut url = format!(
            "{}{}/serviceValidate?service={}&ticket={}",
            self.server_base_url,
            self.validation_path,
            urlencoding::encode(service),
            urlencoding::encode(ticket)
        );
        if self.renew {
            url.push_str("&renew=true");
        }
        url
    }
}
