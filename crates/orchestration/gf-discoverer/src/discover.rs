//! Per-product granule discovery.

use gf_convention::{ConventionRegistry, FilenameFilterer, GranuleTable, TreeWalker};
use gf_error::Result;
use gf_types::Filters;
use gf_traits::TreeListing;
use tracing::info;

use crate::config::{LayoutConfig, Product};
use crate::tds::{ThreddsCatalog, ThreddsConfig};

/// Finds the granules of configured products on a listing provider.
///
/// The discoverer is generic over the listing provider so tests can replace
/// the THREDDS client with an in-memory tree.
pub struct GranuleDiscoverer<L: TreeListing> {
    config: LayoutConfig,
    registry: ConventionRegistry,
    listing: L,
}

impl GranuleDiscoverer<ThreddsCatalog> {
    /// Discoverer listing the THREDDS server of `config` with the built-in
    /// conventions.
    pub fn thredds(config: LayoutConfig, thredds: &ThreddsConfig) -> Result<Self> {
        Ok(Self::new(
            config,
            ConventionRegistry::builtin()?,
            ThreddsCatalog::new(thredds)?,
        ))
    }
}

impl<L: TreeListing> GranuleDiscoverer<L> {
    pub fn new(config: LayoutConfig, registry: ConventionRegistry, listing: L) -> Self {
        Self {
            config,
            registry,
            listing,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConventionRegistry {
        &self.registry
    }

    pub fn listing(&self) -> &L {
        &self.listing
    }

    /// List the granules of a product with their decoded fields.
    ///
    /// Default filters of the product are applied under `filters`: a key
    /// given by the caller replaces the default.
    ///
    /// # Errors
    ///
    /// - [`GfError::Config`](gf_error::GfError::Config) for an unknown product,
    ///   data type, convention or layout
    /// - [`GfError::FileListing`](gf_error::GfError::FileListing) for keys
    ///   unknown to both the convention and the layout
    /// - Listing errors from the provider
    pub fn list_granules(&self, product: &Product, filters: &Filters) -> Result<GranuleTable> {
        let resolved = self.config.resolve(product, &self.registry)?;
        let root = self.config.catalog_url(&resolved.catalog_path);
        let filters = filters.merged_over(&resolved.default_filters);

        info!(
            product = %resolved.id,
            root = %root,
            filters = filters.len(),
            "Discovering granules"
        );

        let walker = TreeWalker::new(&self.listing, Some(resolved.layout.as_ref()));
        FilenameFilterer::new(resolved.convention.as_ref(), walker).list(&root, &filters)
    }

    /// URLs of the granules of a product passing `filters`.
    pub fn filter_granules(&self, product: &Product, filters: &Filters) -> Result<Vec<String>> {
        Ok(self.list_granules(product, filters)?.into_paths())
    }
}
