// error.rs - Error types for proxy validation, path probing and catalog loading

use thiserror::Error;

/// Errors raised while building or validating the upstream proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The liveness probe through the proxy did not return 200
    #[error("proxy unavailable: {proxy}")]
    Unavailable { proxy: String },

    #[error("invalid {scheme} proxy address {address}: {source}")]
    InvalidAddress {
        scheme: &'static str,
        address: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

/// Why a single path probe produced no usable body.
///
/// Never leaves [`crate::PathDetector::detect`]; every variant counts
/// as one failed request.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("connection failed")]
    Connect(#[source] reqwest::Error),

    #[error("request error: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("failed to read response body: {0}")]
    Read(#[from] std::io::Error),

    #[error("cannot join {path:?} onto base url: {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(err)
        } else if err.is_connect() {
            ProbeError::Connect(err)
        } else {
            ProbeError::Request(err)
        }
    }
}

impl ProbeError {
    /// Transport-level failures are routine while scanning and only
    /// worth a debug line; anything else points at a local problem.
    /// Body read errors come from the connection (resets, read timeouts).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProbeError::Timeout(_)
                | ProbeError::Connect(_)
                | ProbeError::Request(_)
                | ProbeError::Status(_)
                | ProbeError::EmptyBody
                | ProbeError::Read(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read path catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("path catalog is not a JSON object of path -> signature: {0}")]
    Json(#[from] serde_json::Error),

    #[error("path catalog is empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_body_read_errors_are_transport() {
        let reset = ProbeError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        let timed_out = ProbeError::from(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));

        assert!(reset.is_transport());
        assert!(timed_out.is_transport());
    }

    #[test]
    fn test_bad_join_is_not_transport() {
        let err = ProbeError::InvalidUrl {
            path: "//[".to_string(),
            source: url::ParseError::InvalidIpv6Address,
        };
        assert!(!err.is_transport());
    }
}
