//! Sensitive path probing.
//!
//! Build a [`ProxyManager`] (optionally with a proxy, which is checked
//! before use), hand it to a [`PathDetector`] together with a
//! [`PathCatalog`], then call [`PathDetector::detect`] once per target.
//!
//! Diagnostics are emitted through `tracing`; install a subscriber to
//! see them.

pub mod catalog;
pub mod error;
pub mod path_detector;
pub mod proxy_manager;
pub mod report;
pub mod response_reader;
pub mod settings;

pub use catalog::PathCatalog;
pub use error::{CatalogError, ProbeError, ProxyError};
pub use path_detector::{Detection, PathDetector, StopReason};
pub use proxy_manager::{ProxyConfig, ProxyManager};
pub use settings::RequestSettings;
