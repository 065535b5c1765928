//! Data-access seam between a controller and the remote API.

use async_trait::async_trait;

use crate::error::FetchError;

/// Returns the full, unpaginated collection.
///
/// Filtering, sorting and pagination are the controller's job; sources
/// never see view parameters.
#[async_trait]
pub trait CollectionSource<R>: Send + Sync {
    async fn fetch_collection(&self) -> Result<Vec<R>, FetchError>;
}

/// A source serving a fixed list, for previews and fixtures.
#[derive(Debug, Clone, Default)]
pub struct StaticSource<R> {
    items: Vec<R>,
}

impl<R> StaticSource<R> {
    pub fn new(items: Vec<R>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> CollectionSource<R> for StaticSource<R> {
    async fn fetch_collection(&self) -> Result<Vec<R>, FetchError> {
        Ok(self.items.clone())
    }
}
