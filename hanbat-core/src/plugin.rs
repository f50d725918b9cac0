//! Registry for all category repositories.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::Category;
use crate::ports::{PlacePort, PortError};

/// Repository bundle serving a single category.
pub struct SourcePlugin {
    /// Category served by the repository.
    pub category: Category,
    /// Implementation fetching raw records.
    pub port: Arc<dyn PlacePort>,
}

impl SourcePlugin {
    /// Bundle a port under the category it reports.
    #[must_use]
    pub fn new(port: Arc<dyn PlacePort>) -> Self {
        Self {
            category: port.category(),
            port,
        }
    }
}

/// Registry that resolves repositories by category.
pub struct SourceRegistry {
    plugins: HashMap<Category, SourcePlugin>,
}

impl SourceRegistry {
    /// Build a registry from the provided plugin list. Later plugins win on duplicates.
    #[must_use]
    pub fn new(plugins: Vec<SourcePlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.category, plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Registered categories in tab order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.plugins.contains_key(category))
            .collect()
    }

    /// Look up the repository for the given category.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedCategory`] when no plugin is registered.
    pub fn plugin(&self, category: Category) -> Result<&SourcePlugin, PortError> {
        self.plugins
            .get(&category)
            .ok_or(PortError::UnsupportedCategory(category))
    }
}
