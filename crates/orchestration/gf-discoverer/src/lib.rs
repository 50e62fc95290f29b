//! gf-discoverer - granule discovery on THREDDS catalogs.
//!
//! This crate ties the filename conventions to the products published on a
//! THREDDS Data Server. It supports:
//!
//! - Per-product layout configuration loaded from YAML, with an embedded default
//! - A blocking THREDDS catalog client implementing [`TreeListing`](gf_traits::TreeListing)
//! - Default filters layered under caller filters
//! - Early pruning of the catalog tree through the product layout
//!
//! # Example
//!
//! ```ignore
//! use gf_discoverer::{GranuleDiscoverer, LayoutConfig, ThreddsConfig};
//! use gf_types::Filters;
//!
//! let config = LayoutConfig::embedded()?;
//! let product = config.product("SWOT_L3_LR_SSH_EXPERT")?;
//! let discoverer = GranuleDiscoverer::thredds(config, &ThreddsConfig::default())?;
//!
//! let filters = Filters::new().with("cycle_number", 7).with("pass_number", vec![1, 2]);
//! for url in discoverer.filter_granules(&product, &filters)? {
//!     println!("{url}");
//! }
//! ```

pub mod config;
pub mod discover;
pub mod tds;

pub use config::{
    FilterScalar, FilterValue, LayoutConfig, Product, ProductConfig, ProductLayoutConfig,
    DEFAULT_CATALOG_BASE_URL,
};
pub use discover::GranuleDiscoverer;
pub use tds::{parse_catalog, ThreddsCatalog, ThreddsConfig};
