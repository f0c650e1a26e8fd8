// proxy_manager.rs - Upstream proxy validation
// Purpose: Hold an optional proxy and prove it works before any scan traffic uses it
// Features:
//  - Scheme-keyed proxy configuration (http / https / all)
//  - One liveness probe through the proxy at construction time
//  - Shared blocking HTTP client for the path detector (no redirects, TLS verified)
// Log records name the proxy under test in the `proxy` field.

use crate::error::ProxyError;
use crate::settings::RequestSettings;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Scheme-keyed proxy endpoints. `all` applies to every scheme not
/// covered by a more specific entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<String>,
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route both http and https traffic through `address`
    pub fn all(address: impl Into<String>) -> Self {
        Self {
            all: Some(address.into()),
            ..Self::default()
        }
    }

    pub fn http(mut self, address: impl Into<String>) -> Self {
        self.http = Some(address.into());
        self
    }

    pub fn https(mut self, address: impl Into<String>) -> Self {
        self.https = Some(address.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none() && self.all.is_none()
    }

    fn to_reqwest(&self) -> Result<Vec<reqwest::Proxy>, ProxyError> {
        let mut proxies = Vec::new();
        // reqwest consults proxies in insertion order, so specific schemes go first
        if let Some(address) = &self.http {
            proxies.push(reqwest::Proxy::http(address.as_str()).map_err(|e| invalid_address("http", address, e))?);
        }
        if let Some(address) = &self.https {
            proxies.push(reqwest::Proxy::https(address.as_str()).map_err(|e| invalid_address("https", address, e))?);
        }
        if let Some(address) = &self.all {
            proxies.push(reqwest::Proxy::all(address.as_str()).map_err(|e| invalid_address("all", address, e))?);
        }
        Ok(proxies)
    }
}

fn invalid_address(scheme: &'static str, address: &str, source: reqwest::Error) -> ProxyError {
    ProxyError::InvalidAddress {
        scheme,
        address: address.to_string(),
        source,
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = [("http", &self.http), ("https", &self.https), ("all", &self.all)]
            .into_iter()
            .filter_map(|(scheme, address)| address.as_ref().map(|a| format!("{}={}", scheme, a)))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// Owns the (validated) proxy and the HTTP client built on top of it.
#[derive(Debug, Clone)]
pub struct ProxyManager {
    proxy: Option<ProxyConfig>,
    settings: RequestSettings,
    client: Client,
}

impl ProxyManager {
    pub fn new(proxy: Option<ProxyConfig>) -> Result<Self, ProxyError> {
        Self::with_settings(proxy, RequestSettings::default())
    }

    /// Validate `proxy` (if any) against `settings.check_url`.
    ///
    /// A proxy that fails its liveness probe is rejected with
    /// [`ProxyError::Unavailable`]; it is never silently dropped.
    pub fn with_settings(
        proxy: Option<ProxyConfig>,
        settings: RequestSettings,
    ) -> Result<Self, ProxyError> {
        // An empty mapping means "no proxy"
        let proxy = proxy.filter(|p| !p.is_empty());

        if let Some(config) = &proxy {
            if !is_proxy_working(config, &settings)? {
                warn!(proxy = %config, "Proxy seems to be non-functional");
                return Err(ProxyError::Unavailable {
                    proxy: config.to_string(),
                });
            }
        }

        let client = build_client(proxy.as_ref(), &settings, Policy::none())?;
        Ok(Self {
            proxy,
            settings,
            client,
        })
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    /// Client for scan traffic: redirects disabled, proxy applied
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn build_client(
    proxy: Option<&ProxyConfig>,
    settings: &RequestSettings,
    redirect: Policy,
) -> Result<Client, ProxyError> {
    let mut builder = Client::builder()
        .default_headers(settings.headers.clone())
        .timeout(settings.timeout)
        .connect_timeout(settings.timeout)
        .redirect(redirect);

    match proxy {
        Some(config) => {
            for p in config.to_reqwest()? {
                builder = builder.proxy(p);
            }
        }
        // Without an explicit proxy, ignore HTTP_PROXY & co. from the environment
        None => builder = builder.no_proxy(),
    }

    builder
        .build()
        .map_err(|source| ProxyError::ClientBuild { source })
}

fn is_proxy_working(config: &ProxyConfig, settings: &RequestSettings) -> Result<bool, ProxyError> {
    let client = build_client(Some(config), settings, Policy::limited(5))?;

    match client.get(&settings.check_url).send() {
        Ok(response) if response.status() == StatusCode::OK => {
            info!(proxy = %config, "Proxy detection available");
            Ok(true)
        }
        Ok(response) => {
            warn!(proxy = %config, status = response.status().as_u16(), "Proxy check returned unexpected status");
            Ok(false)
        }
        Err(e) if e.is_timeout() => {
            warn!(proxy = %config, "Proxy connection timed out");
            Ok(false)
        }
        Err(e) if e.is_connect() => {
            warn!(proxy = %config, error = %e, "Error connecting through proxy");
            Ok(false)
        }
        Err(e) => {
            warn!(proxy = %config, error = %e, "Proxy connection error");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::net::{SocketAddr, TcpListener};
    use std::thread;
    use std::time::Duration;

    fn local_settings() -> RequestSettings {
        RequestSettings::default()
            .with_timeout(Duration::from_secs(5))
            .with_check_url("http://liveness.pathprobe.test/")
    }

    /// Accepts connections and never answers
    fn silent_listener() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });
        addr
    }

    #[test]
    fn test_no_proxy_always_succeeds() {
        let manager = ProxyManager::new(None).unwrap();
        assert!(manager.proxy().is_none());
    }

    #[test]
    fn test_empty_config_is_treated_as_absent() {
        let manager = ProxyManager::with_settings(Some(ProxyConfig::new()), local_settings()).unwrap();
        assert!(manager.proxy().is_none());
    }

    #[test]
    fn test_working_proxy_is_retained() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body("ok")
            .create();

        let config = ProxyConfig::new().http(server.url());
        let manager = ProxyManager::with_settings(Some(config.clone()), local_settings()).unwrap();

        mock.assert();
        assert_eq!(manager.proxy(), Some(&config));
        assert_eq!(manager.settings().check_url, "http://liveness.pathprobe.test/");
    }

    #[test]
    fn test_silent_proxy_times_out() {
        let addr = silent_listener();
        let settings = local_settings().with_timeout(Duration::from_secs(1));

        let config = ProxyConfig::all(format!("http://{}", addr));
        let err = ProxyManager::with_settings(Some(config), settings).unwrap_err();

        assert!(matches!(err, ProxyError::Unavailable { .. }));
    }

    #[test]
    fn test_non_200_probe_rejects_proxy() {
        let mut server = Server::new();
        let _mock = server.mock("GET", Matcher::Any).with_status(503).create();

        let config = ProxyConfig::new().http(server.url());
        let err = ProxyManager::with_settings(Some(config), local_settings()).unwrap_err();

        assert!(matches!(err, ProxyError::Unavailable { .. }));
    }

    #[test]
    fn test_unreachable_proxy_rejects_proxy() {
        let config = ProxyConfig::all("http://127.0.0.1:1");
        let err = ProxyManager::with_settings(Some(config), local_settings()).unwrap_err();

        assert!(matches!(err, ProxyError::Unavailable { .. }));
    }

    #[test]
    fn test_malformed_proxy_address() {
        let config = ProxyConfig::new().https("bad proxy host");
        let err = ProxyManager::with_settings(Some(config), local_settings()).unwrap_err();

        assert!(matches!(err, ProxyError::InvalidAddress { scheme: "https", .. }));
    }

    #[test]
    fn test_display_lists_configured_schemes() {
        let config = ProxyConfig::new()
            .http("http://127.0.0.1:8080")
            .https("http://127.0.0.1:8443");
        assert_eq!(
            config.to_string(),
            "{http=http://127.0.0.1:8080, https=http://127.0.0.1:8443}"
        );
    }

    #[test]
    fn test_deserialize_scheme_mapping() {
        let config: ProxyConfig =
            serde_json::from_str(r#"{"http": "http://10.0.0.1:3128", "https": "http://10.0.0.1:3128"}"#)
                .unwrap();
        assert_eq!(config.http.as_deref(), Some("http://10.0.0.1:3128"));
        assert!(config.all.is_none());
    }
}
