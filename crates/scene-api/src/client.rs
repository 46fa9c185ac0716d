//! The imagery API client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use sca_common::scene_filename;

use crate::error::{ApiError, ApiResult};
use crate::types::{SceneRecord, SearchPage, SearchQuery};

const API_KEY_HEADER: &str = "x-api-key";

/// Retry knobs for downloads.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts per scene.
    pub max_attempts: u32,
    /// Initial retry delay (doubles each retry).
    pub initial_delay: Duration,
    /// Maximum retry delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Delay before the given retry (0-based), with exponential backoff.
    pub fn delay_before(&self, retry: u32) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 0..retry {
            delay = std::cmp::min(delay * 2, self.max_delay);
        }
        delay
    }
}

/// Client for scene search and download.
pub struct ImageryClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl ImageryClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> ApiResult<Self> {
        Self::with_retry(base_url, api_key, RetryConfig::default())
    }

    pub fn with_retry(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        retry: RetryConfig,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry,
        })
    }

    /// Search for scenes matching the query, following pagination until the
    /// vendor stops returning a next link.
    pub async fn search(&self, query: &SearchQuery) -> ApiResult<Vec<SceneRecord>> {
        let mut scenes = Vec::new();
        let search_url = format!("{}/scenes/search", self.base_url);

        let mut page = self.fetch_page_post(&search_url, query).await?;
        loop {
            scenes.extend(page.scenes);
            match page.next {
                Some(next_url) => page = self.fetch_page_get(&next_url).await?,
                None => break,
            }
        }

        info!(count = scenes.len(), "Scene search complete");
        Ok(scenes)
    }

    async fn fetch_page_post(&self, url: &str, query: &SearchQuery) -> ApiResult<SearchPage> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&query.filter_json())
            .send()
            .await?;
        Self::parse_page(url, response).await
    }

    async fn fetch_page_get(&self, url: &str) -> ApiResult<SearchPage> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        Self::parse_page(url, response).await
    }

    async fn parse_page(url: &str, response: Response) -> ApiResult<SearchPage> {
        if !response.status().is_success() {
            return Err(ApiError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Download a scene into `dest_dir`, returning the file path.
    ///
    /// Files already present are skipped; transient failures retry with
    /// exponential backoff until the attempt budget runs out.
    pub async fn download_scene(&self, scene: &SceneRecord, dest_dir: &Path) -> ApiResult<PathBuf> {
        fs::create_dir_all(dest_dir).await?;

        let final_path = dest_dir.join(scene_filename(&scene.id, scene.acquired));
        if final_path.exists() {
            info!(scene = %scene.id, "Scene already downloaded, skipping");
            return Ok(final_path);
        }

        let mut last_error = String::new();
        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                let delay = self.retry.delay_before(attempt - 1);
                warn!(
                    scene = %scene.id,
                    attempt,
                    delay_secs = delay.as_secs(),
                    error = %last_error,
                    "Download failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            match self.try_download(scene, &final_path).await {
                Ok(()) => {
                    info!(scene = %scene.id, path = %final_path.display(), "Scene downloaded");
                    return Ok(final_path);
                }
                Err(e) if e.is_transient() => last_error = e.to_string(),
                Err(e) => return Err(e),
            }
        }

        Err(ApiError::RetriesExhausted {
            url: scene.download_url.clone(),
            attempts: self.retry.max_attempts,
            message: last_error,
        })
    }

    /// One download attempt: stream to a partial file, then rename.
    async fn try_download(&self, scene: &SceneRecord, final_path: &Path) -> ApiResult<()> {
        let response = self
            .client
            .get(&scene.download_url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                status: response.status().as_u16(),
                url: scene.download_url.clone(),
            });
        }

        let partial_path = final_path.with_extension("tif.partial");
        let mut file = File::create(&partial_path).await?;
        let mut stream = response.bytes_stream();
        let mut bytes = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&partial_path, final_path).await?;
        debug!(scene = %scene.id, bytes, "Streamed scene payload");
        Ok(())
    }
}
