use crate::api::REMOVAL_PATH;

/// Base URL used when the page itself is served from a loopback host.
pub const LOCAL_SERVICE_BASE: &str = "http://localhost:5000";

const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "[::1]"];

/// Where removal requests go. Resolved once when the app starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    url: String,
}

impl ServiceEndpoint {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into() }
    }

    /// Loopback origins talk to the local development server, everything else
    /// uses the same-origin relative path.
    pub fn for_hostname(hostname: &str) -> Self {
        if is_loopback(hostname) {
            Self::new(format!("{}{}", LOCAL_SERVICE_BASE, REMOVAL_PATH))
        } else {
            Self::new(REMOVAL_PATH)
        }
    }

    /// An explicit non-empty override beats hostname detection.
    pub fn resolve(override_url: Option<&str>, hostname: &str) -> Self {
        match override_url.map(str::trim) {
            Some(url) if !url.is_empty() => Self::new(url),
            _ => Self::for_hostname(hostname),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn is_loopback(hostname: &str) -> bool {
    LOOPBACK_HOSTS
        .iter()
        .any(|host| hostname.eq_ignore_ascii_case(host))
}
