//! Mock catalog fetcher for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::upstream::{
    CatalogApi, CatalogItem, CatalogPage, ContentKind, DiscoverFilters, FetchError,
};

#[derive(Clone)]
enum PageBehavior {
    Page { items: Vec<CatalogItem>, total_pages: u32 },
    Fail,
}

/// Mock implementation of the [`CatalogApi`] trait.
///
/// Pages are configured per `(kind, page)`; unconfigured pages come back
/// empty. A quota trip can be armed from a given page onward. All discover
/// calls are recorded for assertions.
#[derive(Clone, Default)]
pub struct MockCatalogApi {
    pages: Arc<Mutex<HashMap<(ContentKind, u32), PageBehavior>>>,
    quota_from: Arc<Mutex<HashMap<ContentKind, u32>>>,
    details: Arc<Mutex<HashMap<(ContentKind, u32), serde_json::Value>>>,
    providers: Arc<Mutex<HashMap<(ContentKind, u32), serde_json::Value>>>,
    recorded: Arc<Mutex<Vec<(ContentKind, u32)>>>,
}

impl MockCatalogApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure one discover page.
    pub fn with_page(
        self,
        kind: ContentKind,
        page: u32,
        items: Vec<CatalogItem>,
        total_pages: u32,
    ) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((kind, page), PageBehavior::Page { items, total_pages });
        self
    }

    /// Make one page fail with `PageFailed`.
    pub fn with_failing_page(self, kind: ContentKind, page: u32) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((kind, page), PageBehavior::Fail);
        self
    }

    /// Trip the quota for every page from `page` onward.
    pub fn with_quota_from_page(self, kind: ContentKind, page: u32) -> Self {
        self.quota_from.lock().unwrap().insert(kind, page);
        self
    }

    pub fn with_detail(self, kind: ContentKind, id: u32, body: serde_json::Value) -> Self {
        self.details.lock().unwrap().insert((kind, id), body);
        self
    }

    pub fn with_providers(self, kind: ContentKind, id: u32, body: serde_json::Value) -> Self {
        self.providers.lock().unwrap().insert((kind, id), body);
        self
    }

    /// Discover calls made so far, as `(kind, page)` pairs.
    pub fn recorded_pages(&self) -> Vec<(ContentKind, u32)> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for MockCatalogApi {
    async fn discover(
        &self,
        kind: ContentKind,
        _filters: &DiscoverFilters,
        page: u32,
    ) -> Result<CatalogPage, FetchError> {
        self.recorded.lock().unwrap().push((kind, page));

        if let Some(&from) = self.quota_from.lock().unwrap().get(&kind) {
            if page >= from {
                return Err(FetchError::QuotaExceeded);
            }
        }

        let behavior = self.pages.lock().unwrap().get(&(kind, page)).cloned();
        match behavior {
            Some(PageBehavior::Page { items, total_pages }) => Ok(CatalogPage {
                page,
                total_pages,
                items,
            }),
            Some(PageBehavior::Fail) => Err(FetchError::PageFailed {
                page,
                message: "mock page failure".to_string(),
            }),
            None => Ok(CatalogPage {
                page,
                total_pages: 0,
                items: vec![],
            }),
        }
    }

    async fn detail(&self, kind: ContentKind, id: u32) -> Result<serde_json::Value, FetchError> {
        self.details
            .lock()
            .unwrap()
            .get(&(kind, id))
            .cloned()
            .ok_or(FetchError::Api {
                status: 404,
                message: format!("no mock detail for {kind} {id}"),
            })
    }

    async fn watch_providers(
        &self,
        kind: ContentKind,
        id: u32,
    ) -> Result<serde_json::Value, FetchError> {
        self.providers
            .lock()
            .unwrap()
            .get(&(kind, id))
            .cloned()
            .ok_or(FetchError::Api {
                status: 404,
                message: format!("no mock providers for {kind} {id}"),
            })
    }
}
