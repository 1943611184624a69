//! Service code resolver
//!
//! Keeps one active [`ServiceCatalog`] and answers name lookups against it.
//! The catalog is fetched lazily from a [`CatalogSource`] on first use and
//! again once the validity window has passed. A failed or empty fetch falls
//! back to the curated static table, unless an earlier remote catalog is
//! still held, in which case that one stays active.

use crate::runtime::block_on_isolated;
use advisor_application::{CatalogError, CatalogSource, ServiceCodeLookup};
use advisor_domain::{
    AliasTable, CatalogOrigin, ServiceCatalog, ServiceInfo, SubstringPolicy, static_catalog,
};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default lifetime of a loaded catalog
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(24 * 60 * 60);

struct LoadedCatalog {
    catalog: Arc<ServiceCatalog>,
    loaded_at: Instant,
}

pub struct ServiceCodeResolver {
    source: Option<Arc<dyn CatalogSource>>,
    aliases: AliasTable,
    policy: SubstringPolicy,
    validity: Duration,
    fetch_timeout: Duration,
    loaded: RwLock<Option<LoadedCatalog>>,
    /// Serializes population so one stale window triggers one fetch
    refresh_lock: Mutex<()>,
}

impl ServiceCodeResolver {
    /// Resolver backed by a remote source
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self::build(Some(source))
    }

    /// Resolver that only ever uses the static table
    pub fn offline() -> Self {
        Self::build(None)
    }

    fn build(source: Option<Arc<dyn CatalogSource>>) -> Self {
        Self {
            source,
            aliases: AliasTable::default(),
            policy: SubstringPolicy::default(),
            validity: DEFAULT_VALIDITY,
            fetch_timeout: Duration::from_secs(30),
            loaded: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_policy(mut self, policy: SubstringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    // ==================== Lookups ====================

    /// Canonical code for a service name
    pub fn find_service_code(&self, name: &str) -> Option<String> {
        let catalog = self.catalog();
        let code = catalog
            .find_code(name, &self.aliases, self.policy)
            .map(str::to_string);
        debug!(name = %name, code = ?code, "Service code lookup");
        code
    }

    /// Services whose name contains `keyword`, sorted by display name
    pub fn search_services(&self, keyword: &str) -> Vec<ServiceInfo> {
        self.catalog().search(keyword)
    }

    /// Display name, code and the original search term for `name`
    pub fn get_service_info(&self, name: &str) -> Option<ServiceInfo> {
        let catalog = self.catalog();
        let code = catalog.find_code(name, &self.aliases, self.policy)?;
        Some(ServiceInfo {
            display_name: catalog.display_name_for(code).unwrap_or_else(|| code.to_string()),
            code: code.to_string(),
            search_term: Some(name.to_string()),
        })
    }

    /// Every lowercase display name with its code, in catalog order
    pub fn list_all(&self) -> IndexMap<String, String> {
        self.catalog().to_map()
    }

    pub fn validate_service_code(&self, code: &str) -> bool {
        self.catalog().contains_code(code)
    }

    /// Origin of the active catalog
    pub fn origin(&self) -> CatalogOrigin {
        self.catalog().origin()
    }

    /// Fetch again and replace the active catalog.
    ///
    /// Returns whether the resulting catalog is non-empty.
    pub fn refresh(&self) -> bool {
        let _guard = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let catalog = self.populate();
        !catalog.is_empty()
    }

    // ==================== Population ====================

    /// The active catalog, populating it when absent or stale
    fn catalog(&self) -> Arc<ServiceCatalog> {
        if let Some(catalog) = self.fresh() {
            return catalog;
        }
        let _guard = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have populated while we waited
        if let Some(catalog) = self.fresh() {
            return catalog;
        }
        self.populate()
    }

    fn fresh(&self) -> Option<Arc<ServiceCatalog>> {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|loaded| loaded.loaded_at.elapsed() < self.validity)
            .map(|loaded| Arc::clone(&loaded.catalog))
    }

    /// Fetch and swap in a new catalog. Caller holds `refresh_lock`.
    fn populate(&self) -> Arc<ServiceCatalog> {
        let catalog = match self.source.as_ref().map(|source| self.fetch_remote(source.as_ref())) {
            Some(Ok(catalog)) if !catalog.is_empty() => {
                info!(services = catalog.len(), "Using remote service catalog");
                Arc::new(catalog)
            }
            Some(Ok(_)) => {
                warn!("Remote service catalog is empty");
                self.fallback_catalog()
            }
            Some(Err(e)) => {
                warn!(error = %e, "Remote service catalog unavailable");
                self.fallback_catalog()
            }
            None => {
                debug!("Offline; using static service catalog");
                Arc::new(static_catalog())
            }
        };

        *self.loaded.write().unwrap_or_else(PoisonError::into_inner) = Some(LoadedCatalog {
            catalog: Arc::clone(&catalog),
            loaded_at: Instant::now(),
        });
        catalog
    }

    fn fetch_remote(&self, source: &dyn CatalogSource) -> Result<ServiceCatalog, CatalogError> {
        let timeout = self.fetch_timeout;
        let fetch = async { tokio::time::timeout(timeout, source.fetch()).await };
        match block_on_isolated(fetch) {
            Ok(Ok(result)) => result,
            Ok(Err(_elapsed)) => Err(CatalogError::Timeout),
            Err(e) => Err(CatalogError::Network(e.to_string())),
        }
    }

    /// An earlier remote catalog if one is held, else the static table
    fn fallback_catalog(&self) -> Arc<ServiceCatalog> {
        let previous = self
            .loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|loaded| loaded.catalog.origin() == CatalogOrigin::Remote)
            .map(|loaded| Arc::clone(&loaded.catalog));
        previous.unwrap_or_else(|| {
            info!("Using static service catalog");
            Arc::new(static_catalog())
        })
    }
}

impl ServiceCodeLookup for ServiceCodeResolver {
    fn find_service_code(&self, name: &str) -> Option<String> {
        ServiceCodeResolver::find_service_code(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Serves a fixed remote catalog, or fails when `failing` is set
    struct FakeSource {
        catalog: ServiceCatalog,
        failing: AtomicBool,
        fetches: AtomicUsize,
    }

    impl FakeSource {
        fn new(catalog: ServiceCatalog) -> Arc<Self> {
            Arc::new(Self {
                catalog,
                failing: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
            })
        }

        fn remote() -> Arc<Self> {
            Self::new(
                ServiceCatalog::new(CatalogOrigin::Remote)
                    .with_service("Amazon Elastic Compute Cloud", "AmazonEC2")
                    .with_service("Amazon EC2", "AmazonEC2")
                    .with_service("Amazon Simple Storage Service", "AmazonS3")
                    .with_service("Amazon Relational Database Service", "AmazonRDS"),
            )
        }
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn fetch(&self) -> Result<ServiceCatalog, CatalogError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                Err(CatalogError::Status(503))
            } else {
                Ok(self.catalog.clone())
            }
        }
    }

    struct HangingSource;

    #[async_trait]
    impl CatalogSource for HangingSource {
        async fn fetch(&self) -> Result<ServiceCatalog, CatalogError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_remote_catalog_lookup() {
        let source = FakeSource::remote();
        let resolver = ServiceCodeResolver::new(source.clone());

        assert_eq!(resolver.find_service_code("  AMAZON EC2 ").as_deref(), Some("AmazonEC2"));
        assert_eq!(resolver.find_service_code("simple storage").as_deref(), Some("AmazonS3"));
        assert_eq!(resolver.origin(), CatalogOrigin::Remote);
        assert!(resolver.validate_service_code("AmazonRDS"));
        assert!(!resolver.validate_service_code("AmazonDynamoDB"));
        // one fetch serves every lookup within the window
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_fetch_uses_static_catalog() {
        let source = FakeSource::remote();
        source.failing.store(true, Ordering::SeqCst);
        let resolver = ServiceCodeResolver::new(source);

        assert_eq!(resolver.origin(), CatalogOrigin::Static);
        assert_eq!(resolver.find_service_code("ec2").as_deref(), Some("AmazonEC2"));
    }

    #[test]
    fn test_empty_fetch_uses_static_catalog() {
        let resolver = ServiceCodeResolver::new(FakeSource::new(ServiceCatalog::new(CatalogOrigin::Remote)));
        assert_eq!(resolver.origin(), CatalogOrigin::Static);
    }

    #[test]
    fn test_fetch_timeout_uses_static_catalog() {
        let resolver = ServiceCodeResolver::new(Arc::new(HangingSource))
            .with_fetch_timeout(Duration::from_millis(20));
        assert_eq!(resolver.origin(), CatalogOrigin::Static);
    }

    #[test]
    fn test_offline_resolver() {
        let resolver = ServiceCodeResolver::offline();
        assert_eq!(resolver.origin(), CatalogOrigin::Static);
        assert!(resolver.refresh());
        assert!(resolver.find_service_code("").is_none());
        assert!(resolver.find_service_code("quantum teleporter").is_none());
    }

    #[test]
    fn test_expired_catalog_is_refetched() {
        let source = FakeSource::remote();
        let resolver = ServiceCodeResolver::new(source.clone()).with_validity(Duration::ZERO);

        resolver.find_service_code("ec2");
        resolver.find_service_code("ec2");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_refresh_failure_keeps_remote_catalog() {
        let source = FakeSource::remote();
        let resolver = ServiceCodeResolver::new(source.clone());
        assert_eq!(resolver.origin(), CatalogOrigin::Remote);

        source.failing.store(true, Ordering::SeqCst);
        assert!(resolver.refresh());
        assert_eq!(resolver.origin(), CatalogOrigin::Remote);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_search_and_service_info() {
        let resolver = ServiceCodeResolver::new(FakeSource::remote());

        let results = resolver.search_services("amazon");
        let names: Vec<_> = results.iter().map(|s| s.display_name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(results.len(), 4);

        let info = resolver.get_service_info("Amazon Relational Database Service").unwrap();
        assert_eq!(info.code, "AmazonRDS");
        assert_eq!(info.display_name, "Amazon Relational Database Service");
        assert_eq!(info.search_term.as_deref(), Some("Amazon Relational Database Service"));
        assert!(resolver.get_service_info("nothing like it").is_none());

        let all = resolver.list_all();
        assert_eq!(all.get("amazon ec2").map(String::as_str), Some("AmazonEC2"));
    }

    #[test]
    fn test_reject_ambiguous_policy() {
        let source = FakeSource::new(
            ServiceCatalog::new(CatalogOrigin::Remote)
                .with_service("amazon s3", "AmazonS3")
                .with_service("amazon s3 glacier", "AmazonGlacier"),
        );
        let first = ServiceCodeResolver::new(source.clone());
        assert_eq!(first.find_service_code("s3 gl").as_deref(), Some("AmazonGlacier"));
        assert_eq!(first.find_service_code("amazon s").as_deref(), Some("AmazonS3"));

        let strict = ServiceCodeResolver::new(source)
            .with_aliases(AliasTable::empty())
            .with_policy(SubstringPolicy::RejectAmbiguous);
        assert!(strict.find_service_code("amazon s").is_none());
    }

    #[tokio::test]
    async fn test_lookup_from_async_context() {
        let resolver = ServiceCodeResolver::new(FakeSource::remote());
        assert_eq!(resolver.find_service_code("relational database").as_deref(), Some("AmazonRDS"));
    }
}
