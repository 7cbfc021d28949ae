use std::path::PathBuf;

use adv_core::{AdventureError, Locator};
use adv_runtime::StoryFetcher;
use async_trait::async_trait;

/// Loads linked documents over HTTP and from disk. Relative paths resolve
/// against the directory of the story being played.
pub(crate) struct CliFetcher {
    base_dir: PathBuf,
    http_client: reqwest::Client,
}

impl CliFetcher {
    pub(crate) fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            http_client: reqwest::Client::new(),
        }
    }

    pub(crate) fn resolve_path(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    async fn fetch_url(&self, url: &str) -> Result<String, AdventureError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|error| AdventureError::fetch("FETCH_HTTP", error.to_string()))?;

        if !response.status().is_success() {
            return Err(AdventureError::fetch(
                "FETCH_HTTP_STATUS",
                format!("GET {} returned {}", url, response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|error| AdventureError::fetch("FETCH_HTTP", error.to_string()))
    }

    async fn fetch_file(&self, path: &str) -> Result<String, AdventureError> {
        let resolved = self.resolve_path(path);
        tokio::fs::read_to_string(&resolved).await.map_err(|error| {
            AdventureError::fetch(
                "FETCH_FILE",
                format!("{}: {}", resolved.display(), error),
            )
        })
    }
}

#[async_trait]
impl StoryFetcher for CliFetcher {
    async fn fetch(&self, locator: &Locator) -> Result<String, AdventureError> {
        log::debug!("fetching {}", locator);
        match locator {
            Locator::Url(url) => self.fetch_url(url).await,
            Locator::Path(path) => self.fetch_file(path).await,
        }
    }
}
