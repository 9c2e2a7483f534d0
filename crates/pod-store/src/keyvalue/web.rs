use async_trait::async_trait;
use reqwest::Url;

use crate::error::{StoreError, StoreResult};
use crate::keyvalue::KeyValueStorage;

/// Read-through storage whose keys are URLs.
///
/// `get` answers from the cache when possible and otherwise fetches the URL,
/// caching the body of every successful response. Writes and deletes only
/// affect the cache, which makes them useful for seeding and eviction.
pub struct CachedWebStorage<C> {
    client: reqwest::Client,
    cache: C,
}

impl<C> CachedWebStorage<C>
where
    C: KeyValueStorage<String, String>,
{
    pub fn new(cache: C) -> Self {
        Self::with_client(reqwest::Client::new(), cache)
    }

    pub fn with_client(client: reqwest::Client, cache: C) -> Self {
        Self { client, cache }
    }

    /// The cache backing this storage.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    async fn fetch(&self, url: Url) -> StoreResult<Option<String>> {
        let fetch_err = |source| StoreError::Fetch {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(fetch_err)?;
        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "remote document unavailable");
            return Ok(None);
        }
        let body = response.text().await.map_err(fetch_err)?;
        Ok(Some(body))
    }
}

#[async_trait]
impl<C> KeyValueStorage<String, String> for CachedWebStorage<C>
where
    C: KeyValueStorage<String, String>,
{
    async fn get(&self, key: &String) -> StoreResult<Option<String>> {
        if let Some(cached) = self.cache.get(key).await? {
            return Ok(Some(cached));
        }
        let Ok(url) = Url::parse(key) else {
            tracing::debug!(key = %key, "not a URL, nothing to fetch");
            return Ok(None);
        };
        if !matches!(url.scheme(), "http" | "https") {
            return Ok(None);
        }
        let Some(body) = self.fetch(url).await? else {
            return Ok(None);
        };
        self.cache.set(key.clone(), body.clone()).await?;
        Ok(Some(body))
    }

    async fn has(&self, key: &String) -> StoreResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn set(&self, key: String, value: String) -> StoreResult<()> {
        self.cache.set(key, value).await
    }

    async fn delete(&self, key: &String) -> StoreResult<bool> {
        self.cache.delete(key).await
    }
}
