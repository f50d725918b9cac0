//! Traits describing repository capabilities and shared helper types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{Category, RawRecord};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to repository backends.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The category has no registered repository.
    #[error("Unsupported category: {0}")]
    UnsupportedCategory(Category),
    /// Internal repository error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Default)]
/// One page of raw records as returned by a repository.
pub struct FetchPage {
    /// Whether the repository considered the request successful.
    pub success: bool,
    /// Records in repository order.
    pub items: Vec<RawRecord>,
}

impl FetchPage {
    /// Successful page carrying `items`.
    #[must_use]
    pub const fn ok(items: Vec<RawRecord>) -> Self {
        Self {
            success: true,
            items,
        }
    }

    /// Page reporting failure without records.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            success: false,
            items: Vec::new(),
        }
    }
}

#[async_trait]
/// Trait for category-specific record repositories.
pub trait PlacePort: Send + Sync {
    /// Category served by this repository.
    fn category(&self) -> Category;

    /// Fetch one page of records. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the repository request fails.
    async fn fetch(&self, page: u32, page_size: u32) -> Result<FetchPage, PortError>;
}
