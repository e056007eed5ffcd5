//! Short link creation and resolution service.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::RateLimiter;
use crate::domain::entities::short_mapping::key_for;
use crate::domain::entities::{RateLimitDecision, ShortMapping};
use crate::domain::store::KeyValueStore;
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, validate_custom_code};
use tracing::{debug, info};

/// Settings for links created by [`LinkService`].
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Public base URL short links are built on, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// How long a mapping lives in the store.
    pub link_ttl: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            link_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

/// Result of a successful creation.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub mapping: ShortMapping,
    pub short_url: String,
    /// Client quota after this creation.
    pub rate_limit: RateLimitDecision,
}

/// Service for creating and resolving short links.
///
/// Creation is gated by the per-client [`RateLimiter`]; codes are either drawn
/// by the [`CodeGenerator`] or supplied by the caller, and in both cases are
/// reserved with a conditional write so a live code is never reassigned.
pub struct LinkService {
    store: Arc<dyn KeyValueStore>,
    generator: CodeGenerator,
    rate_limiter: RateLimiter,
    settings: LinkSettings,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        generator: CodeGenerator,
        rate_limiter: RateLimiter,
        settings: LinkSettings,
    ) -> Self {
        Self {
            store,
            generator,
            rate_limiter,
            settings,
        }
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Creates a short link for `url` on behalf of `client_id`.
    ///
    /// # Flow
    ///
    /// 1. Reject an empty URL or malformed custom code (no quota consumed)
    /// 2. Reserve one unit of the client's quota
    /// 3. Reserve the custom code, or allocate a random one
    /// 4. Return the mapping with the quota left in the window
    ///
    /// The quota unit is spent once the request passes the limiter, even if
    /// the code reservation then fails.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an empty URL or invalid custom code
    /// - [`AppError::RateLimitExceeded`] when the client's quota is exhausted
    /// - [`AppError::CodeInUse`] if the custom code is already mapped
    /// - [`AppError::CodeSpaceExhausted`] if no free random code was found
    /// - [`AppError::Storage`] on store failures
    pub async fn create_short_link(
        &self,
        client_id: &str,
        url: String,
        custom_code: Option<String>,
    ) -> Result<CreatedLink, AppError> {
        if url.trim().is_empty() {
            return Err(AppError::bad_request("URL is missing!"));
        }

        let custom_code = custom_code.filter(|c| !c.is_empty());
        if let Some(code) = &custom_code {
            validate_custom_code(code)?;
        }

        let rate_limit = self.rate_limiter.check_and_reserve(client_id).await?;
        if !rate_limit.allowed {
            return Err(AppError::RateLimitExceeded {
                reset_in: rate_limit.reset_in,
            });
        }

        let code = match custom_code {
            Some(code) => self.reserve_custom_code(code, &url).await?,
            None => {
                self.generator
                    .allocate(self.store.as_ref(), key_for, &url, self.settings.link_ttl)
                    .await?
            }
        };

        let mapping = ShortMapping::new(code, url, self.settings.link_ttl);
        let short_url = self.short_url(&mapping.code);

        info!(
            client = client_id,
            code = %mapping.code,
            remaining = rate_limit.remaining,
            "Short link created"
        );
        metrics::counter!("shortlink_links_created_total").increment(1);

        Ok(CreatedLink {
            mapping,
            short_url,
            rate_limit,
        })
    }

    /// Resolves a short code to its original URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::MissingCode`] if `code` is empty
    /// - [`AppError::NotFound`] if no live mapping exists
    /// - [`AppError::Storage`] on store failures
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::MissingCode);
        }

        let url = self
            .store
            .get(&key_for(code))
            .await?
            .ok_or_else(|| AppError::NotFound {
                code: code.to_string(),
            })?;

        debug!(code, url = %url, "Short code resolved");
        Ok(url)
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!(
            "{}/short/{}",
            self.settings.base_url.trim_end_matches('/'),
            code
        )
    }

    async fn reserve_custom_code(&self, code: String, url: &str) -> Result<String, AppError> {
        let reserved = self
            .store
            .set_if_absent(&key_for(&code), url, self.settings.link_ttl)
            .await?;

        if reserved {
            Ok(code)
        } else {
            Err(AppError::CodeInUse { code })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RateLimitPolicy;
    use crate::domain::store::{MockKeyValueStore, StoreError};
    use crate::infrastructure::store::MemoryStore;

    fn service_with(store: Arc<dyn KeyValueStore>) -> LinkService {
        LinkService::new(
            store.clone(),
            CodeGenerator::default(),
            RateLimiter::new(store, RateLimitPolicy::default()),
            LinkSettings::default(),
        )
    }

    fn service() -> LinkService {
        service_with(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_then_resolve() {
        let service = service();

        let created = service
            .create_short_link("1.2.3.4", "http://example.com".to_string(), None)
            .await
            .unwrap();

        assert_eq!(created.mapping.url, "http://example.com");
        assert_eq!(created.mapping.code.len(), 6);
        assert_eq!(created.rate_limit.remaining, 9);
        assert_eq!(
            created.short_url,
            format!("http://localhost:8080/short/{}", created.mapping.code)
        );

        let url = service.resolve(&created.mapping.code).await.unwrap();
        assert_eq!(url, "http://example.com");
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let result = service().resolve("zzzzzz").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_empty_code() {
        let result = service().resolve("").await;
        assert!(matches!(result, Err(AppError::MissingCode)));
    }

    #[tokio::test]
    async fn test_create_with_custom_code() {
        let service = service();

        let created = service
            .create_short_link(
                "1.2.3.4",
                "http://example.com".to_string(),
                Some("promo2025".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(created.mapping.code, "promo2025");
        assert_eq!(
            service.resolve("promo2025").await.unwrap(),
            "http://example.com"
        );
    }

    #[tokio::test]
    async fn test_custom_code_conflict_keeps_original_mapping() {
        let service = service();

        service
            .create_short_link(
                "1.2.3.4",
                "http://first.com".to_string(),
                Some("taken".to_string()),
            )
            .await
            .unwrap();

        let result = service
            .create_short_link(
                "5.6.7.8",
                "http://second.com".to_string(),
                Some("taken".to_string()),
            )
            .await;

        assert!(matches!(result, Err(AppError::CodeInUse { .. })));
        assert_eq!(service.resolve("taken").await.unwrap(), "http://first.com");
    }

    #[tokio::test]
    async fn test_invalid_custom_code_does_not_consume_quota() {
        let service = service();

        let result = service
            .create_short_link(
                "1.2.3.4",
                "http://example.com".to_string(),
                Some("no spaces".to_string()),
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let status = service.rate_limiter().status("1.2.3.4").await.unwrap();
        assert_eq!(status.remaining, 10);
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected() {
        let result = service()
            .create_short_link("1.2.3.4", "  ".to_string(), None)
            .await;

        match result {
            Err(AppError::Validation { message }) => assert_eq!(message, "URL is missing!"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_eleventh_creation_in_window_is_rejected() {
        let service = service();

        for expected in (0..10).rev() {
            let created = service
                .create_short_link("1.2.3.4", "http://example.com".to_string(), None)
                .await
                .unwrap();
            assert_eq!(created.rate_limit.remaining, expected);
        }

        let result = service
            .create_short_link("1.2.3.4", "http://example.com".to_string(), None)
            .await;

        match result {
            Err(AppError::RateLimitExceeded { reset_in }) => assert!(reset_in > Duration::ZERO),
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mapping_expires_after_link_ttl() {
        let service = service();
        let created = service
            .create_short_link("1.2.3.4", "http://example.com".to_string(), None)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(24 * 3600)).await;

        let result = service.resolve(&created.mapping.code).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_store_write_failure_surfaces_as_storage_error() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_decrement_with_floor()
            .times(1)
            .returning(|_, _, _| Ok(Some(9)));
        store
            .expect_time_to_live()
            .returning(|_| Ok(Some(Duration::from_secs(120))));
        store
            .expect_set_if_absent()
            .times(1)
            .returning(|_, _, _| Err(StoreError::Operation("OOM".to_string())));

        let service = service_with(Arc::new(store));
        let result = service
            .create_short_link("1.2.3.4", "http://example.com".to_string(), None)
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_rate_limited_request_never_touches_mappings() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_decrement_with_floor()
            .times(1)
            .returning(|_, _, _| Ok(None));
        store
            .expect_time_to_live()
            .returning(|_| Ok(Some(Duration::from_secs(30))));
        store.expect_set_if_absent().times(0);

        let service = service_with(Arc::new(store));
        let result = service
            .create_short_link("1.2.3.4", "http://example.com".to_string(), None)
            .await;

        assert!(matches!(result, Err(AppError::RateLimitExceeded { .. })));
    }

    #[tokio::test]
    async fn test_huge_link_ttl_does_not_panic() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let service = LinkService::new(
            store.clone(),
            CodeGenerator::default(),
            RateLimiter::new(store, RateLimitPolicy::default()),
            LinkSettings {
                base_url: "http://localhost:8080".to_string(),
                link_ttl: Duration::from_secs(u64::MAX),
            },
        );

        let created = service
            .create_short_link("1.2.3.4", "http://example.com".to_string(), None)
            .await
            .unwrap();

        assert_eq!(
            service.resolve(&created.mapping.code).await.unwrap(),
            "http://example.com"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_custom_code_has_single_winner() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let service = Arc::new(service_with(store));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .create_short_link(
                            &format!("10.0.0.{i}"),
                            format!("http://example.com/{i}"),
                            Some("contested".to_string()),
                        )
                        .await
                })
            })
            .collect();

        let mut created = 0;
        let mut in_use = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(link) => {
                    assert_eq!(link.mapping.code, "contested");
                    created += 1;
                }
                Err(AppError::CodeInUse { .. }) => in_use += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(in_use, 19);
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let service = LinkService::new(
            store.clone(),
            CodeGenerator::default(),
            RateLimiter::new(store, RateLimitPolicy::default()),
            LinkSettings {
                base_url: "https://s.example.com/".to_string(),
                link_ttl: Duration::from_secs(60),
            },
        );

        assert_eq!(
            service.short_url("aB3xYz"),
            "https://s.example.com/short/aB3xYz"
        );
    }
}
