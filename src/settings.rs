// settings.rs - Request settings shared by the proxy check and the path detector
// Purpose: One place for the timeout, the default header set and the liveness URL

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Stop scanning once more than this many probes failed
pub const MAX_FAILED_COUNT: usize = 80;
/// Stop scanning (and discard results) once more than this many probes matched
pub const MAX_SUCCESS_COUNT: usize = 50;
/// Read granularity for event-stream bodies
pub const CHUNK_SIZE: usize = 1024;
/// Byte cap for event-stream bodies (5 KB)
pub const SSE_MAX_SIZE: usize = 5120;
/// Character cap for ordinary bodies (100 KB)
pub const MAX_RESPONSE_LENGTH: usize = 102_400;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CHECK_URL: &str = "https://www.baidu.com/";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct RequestSettings {
    pub timeout: Duration,
    pub headers: HeaderMap,
    /// URL fetched through a candidate proxy to prove it works
    pub check_url: String,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            headers: default_headers(),
            check_url: DEFAULT_CHECK_URL.to_string(),
        }
    }
}

impl RequestSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_check_url(mut self, url: impl Into<String>) -> Self {
        self.check_url = url.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,zh-CN;q=0.8"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    headers
}
