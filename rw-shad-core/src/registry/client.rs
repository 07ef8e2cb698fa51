//! Remote registry access

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;
use tracing::debug;

use super::component::{validate_item, Component};
use crate::config::ShadConfig;
use crate::error::{Result, ShadError};

/// Where registry payloads come from
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Fetch the raw registry index
    async fn fetch_index(&self) -> Result<Value>;

    /// Fetch the raw payload of a single component
    async fn fetch_item(&self, name: &str) -> Result<Value>;
}

/// Registry served over HTTP (`<base>/index.json`, `<base>/styles/<style>/<name>.json`)
pub struct HttpRegistry {
    client: reqwest::Client,
    config: ShadConfig,
}

impl HttpRegistry {
    pub fn new(config: &ShadConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rw-shad/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShadError::RegistryFetch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn get_json(&self, url: &str) -> std::result::Result<Value, FetchFailure> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Other(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchFailure::NotFound);
        }
        if !status.is_success() {
            return Err(FetchFailure::Other(format!("HTTP {status} from {url}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchFailure::Other(format!("Failed to read response from {url}: {e}")))
    }
}

enum FetchFailure {
    NotFound,
    Other(String),
}

#[async_trait]
impl RegistrySource for HttpRegistry {
    async fn fetch_index(&self) -> Result<Value> {
        let url = self.config.index_url();
        self.get_json(&url).await.map_err(|failure| match failure {
            FetchFailure::NotFound => ShadError::RegistryFetch(format!("HTTP 404 Not Found from {url}")),
            FetchFailure::Other(message) => ShadError::RegistryFetch(message),
        })
    }

    async fn fetch_item(&self, name: &str) -> Result<Value> {
        let url = self.config.item_url(name);
        self.get_json(&url).await.map_err(|failure| match failure {
            FetchFailure::NotFound => ShadError::ComponentNotFound(name.to_string()),
            FetchFailure::Other(message) => ShadError::RegistryFetch(message),
        })
    }
}

/// Fetch several components concurrently
///
/// Fail-fast: the first failing fetch fails the whole batch, so callers never
/// see a partial set.
pub async fn fetch_components(source: &dyn RegistrySource, names: &[String]) -> Result<Vec<Component>> {
    debug!("Fetching {} components missing from the registry index", names.len());

    let fetches = names.iter().map(|name| async move {
        let payload = source.fetch_item(name).await?;
        let component = validate_item(&payload)?;
        if component.name != *name {
            return Err(ShadError::RegistryFetch(format!(
                "Registry returned \"{}\" when asked for \"{}\"",
                component.name, name
            )));
        }
        Ok::<_, ShadError>(component)
    });

    try_join_all(fetches).await
}
