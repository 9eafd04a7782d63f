use super::cloud_providers::{CloudProvider, CloudTokens};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session-scoped cache for the cloud access credential.
///
/// The token lives here and nowhere else; callers acquire it per batch and
/// may invalidate it when the provider rejects it.
pub struct TokenManager {
    provider: Arc<dyn CloudProvider>,
    cached: Mutex<Option<CloudTokens>>,
}

impl TokenManager {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached access token, re-acquiring it when missing or
    /// within five minutes of expiry.
    pub async fn get_valid_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(tokens) = cached.as_ref() {
            if tokens.expires_at > Utc::now() + chrono::Duration::minutes(5) {
                tracing::debug!("Using cached {} token", self.provider.provider_id());
                return Ok(tokens.access_token.clone());
            }
        }

        let fresh = self.provider.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cloud_providers::CloudFile;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        requests: AtomicUsize,
        ttl_seconds: i64,
    }

    #[async_trait]
    impl CloudProvider for CountingProvider {
        fn provider_id(&self) -> &'static str {
            "counting"
        }

        fn display_name(&self) -> &'static str {
            "Counting"
        }

        async fn request_token(&self) -> Result<CloudTokens> {
            let n = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CloudTokens {
                access_token: format!("token_{}", n),
                expires_at: Utc::now() + chrono::Duration::seconds(self.ttl_seconds),
            })
        }

        async fn upload_file(
            &self, _access_token: &str, file_name: &str, _data: Bytes, _mime_type: &str,
        ) -> Result<CloudFile> {
            Ok(CloudFile {
                id: "id".to_string(),
                name: file_name.to_string(),
                mime_type: None,
                size: None,
                modified_at: None,
            })
        }

        async fn list_files(&self, _access_token: &str) -> Result<Vec<CloudFile>> {
            Ok(vec![])
        }

        async fn download_file(&self, _access_token: &str, _file_id: &str) -> Result<Bytes> {
            Ok(Bytes::new())
        }

        async fn delete_file(&self, _access_token: &str, _file_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_token_is_cached_while_fresh() {
        let provider = Arc::new(CountingProvider {
            requests: AtomicUsize::new(0),
            ttl_seconds: 3600,
        });
        let manager = TokenManager::new(provider.clone());

        assert_eq!(manager.get_valid_token().await.unwrap(), "token_1");
        assert_eq!(manager.get_valid_token().await.unwrap(), "token_1");
        assert_eq!(provider.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expiring_token_is_reacquired() {
        // TTL inside the five-minute margin counts as expired
        let provider = Arc::new(CountingProvider {
            requests: AtomicUsize::new(0),
            ttl_seconds: 60,
        });
        let manager = TokenManager::new(provider.clone());

        assert_eq!(manager.get_valid_token().await.unwrap(), "token_1");
        assert_eq!(manager.get_valid_token().await.unwrap(), "token_2");
        assert_eq!(provider.requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_clears_cache() {
        let provider = Arc::new(CountingProvider {
            requests: AtomicUsize::new(0),
            ttl_seconds: 3600,
        });
        let manager = TokenManager::new(provider.clone());

        manager.get_valid_token().await.unwrap();
        manager.invalidate().await;
        assert_eq!(manager.get_valid_token().await.unwrap(), "token_2");
    }
}
