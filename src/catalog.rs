// catalog.rs - Ordered path -> signature catalog
// Purpose: Candidate paths and the substring that proves each one is really exposed
// Iteration order is insertion order; it decides which paths run before a threshold stop.

use crate::error::CatalogError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Spring Boot / actuator exposure paths probed when no catalog file is given
const BUILTIN_PATHS: &[(&str, &str)] = &[
    // Actuator index (Spring Boot 2.x+)
    ("actuator", "_links"),
    ("actuator/beans", "beans"),
    ("actuator/env", "propertySources"),
    ("actuator/configprops", "contexts"),
    ("actuator/mappings", "dispatcherServlets"),
    ("actuator/conditions", "positiveMatches"),
    ("actuator/health", "status"),
    ("actuator/info", "{"),
    ("actuator/metrics", "names"),
    ("actuator/loggers", "levels"),
    ("actuator/threaddump", "threadName"),
    ("actuator/scheduledtasks", "cron"),
    ("actuator/httptrace", "traces"),
    ("actuator/auditevents", "events"),
    ("actuator/jolokia", "agent"),
    ("actuator/gateway/routes", "route_id"),
    ("actuator/prometheus", "# HELP"),
    // Spring Boot 1.x endpoints at the root
    ("beans", "beans"),
    ("env", "profiles"),
    ("mappings", "handler"),
    ("trace", "timestamp"),
    ("jolokia", "agent"),
    ("jolokia/list", "mbeans"),
    // API documentation
    ("v2/api-docs", "swagger"),
    ("v3/api-docs", "openapi"),
    ("swagger-ui.html", "swagger"),
    // Druid monitor
    ("druid/index.html", "Druid"),
    ("druid/websession.html", "Druid"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathCatalog {
    entries: IndexMap<String, String>,
}

impl PathCatalog {
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_PATHS.iter().copied())
    }

    /// Later duplicates overwrite the signature but keep the first position
    pub fn from_pairs<P, S>(pairs: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: Into<String>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(path, signature)| (path.into(), signature.into()))
                .collect(),
        }
    }

    /// Parse a JSON object `{"path": "signature", ...}`, keeping key order
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: PathCatalog = serde_json::from_str(json)?;
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_starts_with_actuator_index() {
        let catalog = PathCatalog::builtin();
        let first: Vec<_> = catalog.iter().take(2).collect();
        assert_eq!(first, vec![("actuator", "_links"), ("actuator/beans", "beans")]);
        assert_eq!(catalog.len(), BUILTIN_PATHS.len());
    }

    #[test]
    fn test_json_keeps_file_order() {
        let catalog =
            PathCatalog::from_json_str(r#"{"z/last": "a", "a/first": "b", "m/middle": "c"}"#).unwrap();
        let paths: Vec<_> = catalog.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["z/last", "a/first", "m/middle"]);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(PathCatalog::from_json_str("{}"), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            PathCatalog::from_json_str(r#"["actuator"]"#),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"actuator": "_links"}}"#).unwrap();

        let catalog = PathCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec![("actuator", "_links")]);
    }

    #[test]
    fn test_missing_file() {
        let err = PathCatalog::from_json_file(Path::new("/nonexistent/pathprobe/catalog.json"));
        assert!(matches!(err, Err(CatalogError::Io(_))));
    }
}
