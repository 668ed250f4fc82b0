// config.rs
// Service endpoints and runtime settings

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://monitor.nowum.fh-aachen.de/oeds/";
pub const DEFAULT_SCHEMAS_PATH: &str = "rpc/swagger_schemas";
pub const DEFAULT_METADATA_PATH: &str = "metadata";
pub const PROFILE_HEADER: &str = "Accept-Profile";

/// The three service URLs the explorer talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub schemas: Url,
    /// Root document; answers with the OpenAPI spec of the profile named in [`PROFILE_HEADER`].
    pub spec: Url,
    pub metadata: Url,
}

impl Endpoints {
    pub fn from_base(base: &str, schemas_path: &str, metadata_path: &str) -> Result<Self> {
        let mut base = Url::parse(base).with_context(|| format!("Invalid base URL '{}'", base))?;
        // Url::join drops the last segment unless the base ends in a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            schemas: base.join(schemas_path).context("Invalid schemas path")?,
            metadata: base.join(metadata_path).context("Invalid metadata path")?,
            spec: base,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoints: Endpoints,
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_from_base_without_trailing_slash() {
        let e = Endpoints::from_base("http://localhost:3000/oeds", DEFAULT_SCHEMAS_PATH, DEFAULT_METADATA_PATH).unwrap();
        assert_eq!(e.schemas.as_str(), "http://localhost:3000/oeds/rpc/swagger_schemas");
        assert_eq!(e.metadata.as_str(), "http://localhost:3000/oeds/metadata");
        assert_eq!(e.spec.as_str(), "http://localhost:3000/oeds/");
    }

    #[test]
    fn default_matches_production_base() {
        let e = Endpoints::from_base(DEFAULT_BASE_URL, DEFAULT_SCHEMAS_PATH, DEFAULT_METADATA_PATH).unwrap();
        assert_eq!(e.schemas.as_str(), "https://monitor.nowum.fh-aachen.de/oeds/rpc/swagger_schemas");
        assert_eq!(e.spec.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_garbage_base() {
        assert!(Endpoints::from_base("not a url", "a", "b").is_err());
    }
}
