//! High-level service facade combining all repositories.

use std::sync::Arc;

use crate::model::{Category, Place};
use crate::normalize::normalize_all;
use crate::plugin::SourceRegistry;
use crate::ports::PortError;
use crate::validate::CoordinateValidator;

/// Public entry point for loading normalized places per category.
pub struct PlaceService {
    registry: Arc<SourceRegistry>,
    validator: CoordinateValidator,
}

impl PlaceService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<SourceRegistry>, validator: CoordinateValidator) -> Self {
        Self {
            registry,
            validator,
        }
    }

    /// Categories that have a repository.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.registry.categories()
    }

    /// Fetch and normalize one page of records.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the category is unsupported, the request fails,
    /// or the repository reports `success: false`.
    pub async fn try_places(
        &self,
        category: Category,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Place>, PortError> {
        let plugin = self.registry.plugin(category)?;
        let fetched = plugin.port.fetch(page, page_size).await?;
        if !fetched.success {
            return Err(PortError::Internal(format!(
                "{category} repository reported failure"
            )));
        }

        let mut places = normalize_all(fetched.items, &self.validator);
        // A repository answering for another category must not leak into this tab.
        places.retain(|place| place.category == category);
        log::debug!("Fetched {} {category} places (page {page})", places.len());
        Ok(places)
    }

    /// Fetch and normalize one page, treating any failure as an empty result.
    pub async fn places(&self, category: Category, page: u32, page_size: u32) -> Vec<Place> {
        self.try_places(category, page, page_size)
            .await
            .unwrap_or_else(|err| {
                log::warn!("No {category} data: {err}");
                Vec::new()
            })
    }
}
