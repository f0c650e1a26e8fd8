// path_detector.rs - Sensitive Path Detection Module
// Purpose: Probe a catalog of candidate paths against a base URL and report the exposed ones
// Features:
//  - One GET per catalog entry, in catalog order, redirects not followed
//  - Case-insensitive signature matching on a size-bounded body
//  - Early stop once too many probes failed
//  - Result set discarded once too many probes matched (catch-all responders)
// Log records name the probed URL in the `url` field.

use crate::catalog::PathCatalog;
use crate::error::ProbeError;
use crate::proxy_manager::{ProxyConfig, ProxyManager};
use crate::response_reader::ReadStrategy;
use crate::settings::{MAX_FAILED_COUNT, MAX_SUCCESS_COUNT};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    CatalogExhausted,
    FailureThreshold,
    SuccessThreshold,
    InvalidBaseUrl,
}

/// Outcome of one scan of one base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Full URLs whose body contained their signature
    pub urls: Vec<String>,
    pub failed_count: usize,
    pub success_count: usize,
    pub stop: StopReason,
}

impl Detection {
    fn empty(stop: StopReason) -> Self {
        Self {
            urls: Vec::new(),
            failed_count: 0,
            success_count: 0,
            stop,
        }
    }
}

pub struct PathDetector {
    paths: PathCatalog,
    proxy: Option<ProxyConfig>,
    client: Client,
}

impl PathDetector {
    pub fn new(paths: PathCatalog, proxy_manager: &ProxyManager) -> Self {
        Self {
            paths,
            proxy: proxy_manager.proxy().cloned(),
            client: proxy_manager.client().clone(),
        }
    }

    pub fn catalog(&self) -> &PathCatalog {
        &self.paths
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    /// Full URLs under `url` that expose their catalog signature.
    pub fn detect(&self, url: &str) -> Vec<String> {
        self.scan(url).urls
    }

    /// Like [`detect`](Self::detect), with the counters and stop reason.
    ///
    /// Counters start from zero on every call. More than
    /// `MAX_FAILED_COUNT` failures ends the scan keeping what was found;
    /// more than `MAX_SUCCESS_COUNT` matches ends it with an empty result.
    pub fn scan(&self, url: &str) -> Detection {
        let base = match Url::parse(url) {
            Ok(base) => base,
            Err(e) => {
                error!(url, error = %e, "Invalid base url, skipping target");
                return Detection::empty(StopReason::InvalidBaseUrl);
            }
        };

        let mut detection = Detection::empty(StopReason::CatalogExhausted);

        for (path, signature) in self.paths.iter() {
            if detection.failed_count > MAX_FAILED_COUNT {
                info!(
                    url,
                    failed_count = detection.failed_count,
                    "stop detecting paths! Exceeds the maximum number of failed requests"
                );
                detection.stop = StopReason::FailureThreshold;
                break;
            } else if detection.success_count > MAX_SUCCESS_COUNT {
                info!(
                    url,
                    success_count = detection.success_count,
                    "stop detecting paths! Exceeds the maximum number of successful requests"
                );
                detection.urls.clear();
                detection.stop = StopReason::SuccessThreshold;
                break;
            }

            let full_url = match base.join(path) {
                Ok(joined) => joined.to_string(),
                Err(source) => {
                    log_probe_error(url, &ProbeError::InvalidUrl {
                        path: path.to_string(),
                        source,
                    });
                    detection.failed_count += 1;
                    continue;
                }
            };

            let body = match self.make_request(&full_url) {
                Ok(body) => body,
                Err(e) => {
                    log_probe_error(&full_url, &e);
                    detection.failed_count += 1;
                    continue;
                }
            };

            if contains_signature(&body, signature) {
                detection.success_count += 1;
                info!(url = %full_url, "<-- [success detected path!]");
                detection.urls.push(full_url);
            }
        }

        detection
    }

    fn make_request(&self, url: &str) -> Result<String, ProbeError> {
        let response = self.client.get(url).send()?;

        debug!(
            url,
            status = response.status().as_u16(),
            content_length = response.content_length().unwrap_or(0),
            "probe response"
        );

        ReadStrategy::for_response(&response).read(response)
    }
}

fn contains_signature(body: &str, signature: &str) -> bool {
    body.to_lowercase().contains(&signature.to_lowercase())
}

fn log_probe_error(url: &str, err: &ProbeError) {
    if err.is_transport() {
        debug!(url, error = %err, "Request error");
    } else {
        error!(url, error = %err, "An unexpected error occurred during path detection");
    }
}
