//! Product layout configuration.
//!
//! The layout document tells, for every product published on the catalog
//! server, where its tree starts and which convention and layout describe
//! its file and folder names.

use gf_convention::{ConventionRegistry, FilenameConvention, Layout};
use gf_error::{GfError, Result};
use gf_types::{Filters, Reference, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Root of the AVISO THREDDS catalogs.
pub const DEFAULT_CATALOG_BASE_URL: &str =
    "https://tds-odatis.aviso.altimetry.fr/thredds/catalog/";

const EMBEDDED_LAYOUT_CONFIG: &str = include_str!("../resources/tds_layout.yaml");

/// A product of the catalog, as known by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Catalog identifier, key of the layout configuration
    pub id: String,
    pub short_name: Option<String>,
    pub title: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            short_name: None,
            title: None,
        }
    }

    /// Set the short name.
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn label(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} - {}", self.id),
            None => self.id.clone(),
        }
    }
}

/// A scalar default filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterScalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<FilterScalar> for Value {
    fn from(scalar: FilterScalar) -> Self {
        match scalar {
            FilterScalar::Int(v) => Value::Int(v),
            FilterScalar::Float(v) => Value::Float(v),
            FilterScalar::Text(v) => Value::Str(v),
        }
    }
}

/// A default filter as written in the layout document.
///
/// ```yaml
/// filters:
///   subset: Basic                         # equality
///   cycle_number: [1, 2, 3]               # membership
///   time: {start: 2024-01-01, stop: null} # bounds
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(FilterScalar),
    List(Vec<FilterScalar>),
    Bounds {
        start: Option<FilterScalar>,
        stop: Option<FilterScalar>,
    },
}

impl FilterValue {
    fn into_reference(self, key: &str) -> Result<Reference> {
        match self {
            FilterValue::Scalar(v) => Ok(Reference::Value(v.into())),
            FilterValue::List(items) => Ok(Reference::List(
                items.into_iter().map(Value::from).collect(),
            )),
            FilterValue::Bounds {
                start: None,
                stop: None,
            } => Err(GfError::Config(format!(
                "Default filter '{key}' needs a 'start' or a 'stop' bound"
            ))),
            FilterValue::Bounds { start, stop } => Ok(Reference::Bounds(
                start.map(Value::from),
                stop.map(Value::from),
            )),
        }
    }
}

/// Layout entry of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductConfig {
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Key of [`LayoutConfig::granule_discovery`]
    pub data_type: String,
    /// Path of the product tree, relative to the catalog base URL
    pub catalog_path: String,
    /// Filters applied to every listing of the product
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
}

/// The whole layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,

    /// Data type to `(convention, layout)` names
    #[serde(default)]
    pub granule_discovery: BTreeMap<String, (String, String)>,

    /// Product id to product layout
    #[serde(default)]
    pub products: BTreeMap<String, ProductConfig>,
}

fn default_catalog_base_url() -> String {
    DEFAULT_CATALOG_BASE_URL.to_string()
}

/// A product layout with its convention and layout resolved.
#[derive(Debug, Clone)]
pub struct ProductLayoutConfig {
    pub id: String,
    pub title: Option<String>,
    pub convention: Arc<FilenameConvention>,
    pub layout: Arc<Layout>,
    pub catalog_path: String,
    pub default_filters: Filters,
}

impl LayoutConfig {
    /// The layout document shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(EMBEDDED_LAYOUT_CONFIG)
    }

    /// Parse a layout document.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] for malformed YAML.
    pub fn from_yaml(document: &str) -> Result<Self> {
        serde_yaml::from_str(document)
            .map_err(|e| GfError::Config(format!("Invalid layout configuration: {e}")))
    }

    /// Read and parse a layout document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let document = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&document)?;
        debug!(
            path = %path.display(),
            products = config.products.len(),
            "Loaded layout configuration"
        );
        Ok(config)
    }

    /// Set the catalog base URL.
    pub fn with_catalog_base_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_base_url = url.into();
        self
    }

    /// Configured products, sorted by id.
    pub fn products(&self) -> Vec<Product> {
        self.products
            .iter()
            .map(|(id, entry)| Product {
                id: id.clone(),
                short_name: entry.short_name.clone(),
                title: entry.title.clone(),
            })
            .collect()
    }

    /// Find a product by id, then by short name.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] when nothing matches.
    pub fn product(&self, name: &str) -> Result<Product> {
        self.products()
            .into_iter()
            .find(|p| p.id == name)
            .or_else(|| {
                self.products()
                    .into_iter()
                    .find(|p| p.short_name.as_deref() == Some(name))
            })
            .ok_or_else(|| {
                GfError::Config(format!(
                    "Unknown product '{name}'. Run the 'products' command to list the configured products"
                ))
            })
    }

    /// URL of the root catalog of a product tree.
    pub fn catalog_url(&self, catalog_path: &str) -> String {
        let base = self.catalog_base_url.trim_end_matches('/');
        let path = catalog_path.trim_matches('/');
        if path.is_empty() {
            format!("{base}/catalog.xml")
        } else {
            format!("{base}/{path}/catalog.xml")
        }
    }

    /// Resolve the layout of a product against a registry.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] when the product, its data type, or the
    /// convention and layout names are unknown, or when a default filter is
    /// malformed.
    pub fn resolve(
        &self,
        product: &Product,
        registry: &ConventionRegistry,
    ) -> Result<ProductLayoutConfig> {
        let entry = self.products.get(&product.id).ok_or_else(|| {
            GfError::Config(format!(
                "The product {} is missing from the layout configuration",
                product.label()
            ))
        })?;

        let (convention, layout) = self
            .granule_discovery
            .get(&entry.data_type)
            .ok_or_else(|| {
                GfError::Config(format!(
                    "The data type {} is missing from the granule_discovery configuration",
                    entry.data_type
                ))
            })?;

        let mut default_filters = Filters::new();
        for (key, value) in &entry.filters {
            default_filters.insert(key.as_str(), value.clone().into_reference(key)?);
        }

        Ok(ProductLayoutConfig {
            id: product.id.clone(),
            title: entry.title.clone().or_else(|| product.title.clone()),
            convention: registry.convention(convention)?,
            layout: registry.layout(layout)?,
            catalog_path: entry.catalog_path.clone(),
            default_filters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
catalog_base_url: https://tds.mock/
granule_discovery:
  L3_LR_SSH: [swot_l3, swot_lr_ssh]
  BROKEN: [swot_l3, no_such_layout]
products:
  productA:
    short_name: sample_a
    title: Sample Product A
    data_type: L3_LR_SSH
    catalog_path: productA_path
    filters:
      subset: Basic
      cycle_number: [1, 2]
      time: {start: "2024-01-01"}
  productC:
    data_type: L3_LR_SSH
    catalog_path: productC_path
  productD:
    data_type: MISSING
    catalog_path: productD_path
  productE:
    data_type: BROKEN
    catalog_path: productE_path
"#;

    #[test]
    fn test_parse_layout_config() {
        let config = LayoutConfig::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.catalog_base_url, "https://tds.mock/");
        assert_eq!(
            config.granule_discovery["L3_LR_SSH"],
            ("swot_l3".to_string(), "swot_lr_ssh".to_string())
        );
        assert_eq!(config.products.len(), 4);
        assert!(config.products["productC"].filters.is_empty());
    }

    #[test]
    fn test_resolve_product() {
        let config = LayoutConfig::from_yaml(SAMPLE).unwrap();
        let registry = ConventionRegistry::builtin().unwrap();

        let resolved = config.resolve(&Product::new("productA"), &registry).unwrap();
        assert_eq!(resolved.id, "productA");
        assert_eq!(resolved.title.as_deref(), Some("Sample Product A"));
        assert_eq!(resolved.catalog_path, "productA_path");
        assert_eq!(resolved.layout.depth(), 2);
        assert_eq!(
            resolved.default_filters.get("subset"),
            Some(&Reference::Value(Value::from("Basic")))
        );
        assert_eq!(
            resolved.default_filters.get("cycle_number"),
            Some(&Reference::List(vec![Value::Int(1), Value::Int(2)]))
        );
        assert_eq!(
            resolved.default_filters.get("time"),
            Some(&Reference::Bounds(Some(Value::from("2024-01-01")), None))
        );
    }

    #[test]
    fn test_resolve_without_filters() {
        let config = LayoutConfig::from_yaml(SAMPLE).unwrap();
        let registry = ConventionRegistry::builtin().unwrap();

        let resolved = config.resolve(&Product::new("productC"), &registry).unwrap();
        assert!(resolved.default_filters.is_empty());
    }

    #[test]
    fn test_resolve_errors() {
        let config = LayoutConfig::from_yaml(SAMPLE).unwrap();
        let registry = ConventionRegistry::builtin().unwrap();

        for id in ["bad_product_id", "productD", "productE"] {
            let result = config.resolve(&Product::new(id), &registry);
            assert!(matches!(result, Err(GfError::Config(_))), "{id}");
        }
    }

    #[test]
    fn test_unknown_product_message() {
        let config = LayoutConfig::from_yaml(SAMPLE).unwrap();
        let registry = ConventionRegistry::builtin().unwrap();

        let err = config
            .resolve(&Product::new("nope").with_title("Nope"), &registry)
            .unwrap_err();
        assert!(err.to_string().contains("Nope - nope"));
    }

    #[test]
    fn test_find_product_by_id_or_short_name() {
        let config = LayoutConfig::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.product("productA").unwrap().id, "productA");
        assert_eq!(config.product("sample_a").unwrap().id, "productA");
        assert!(matches!(config.product("unknown"), Err(GfError::Config(_))));
    }

    #[test]
    fn test_catalog_url() {
        let config = LayoutConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(
            config.catalog_url("productA_path"),
            "https://tds.mock/productA_path/catalog.xml"
        );
        assert_eq!(config.catalog_url(""), "https://tds.mock/catalog.xml");
    }

    #[test]
    fn test_empty_bounds_rejected() {
        let config = LayoutConfig::from_yaml(
            r#"
granule_discovery:
  L3_LR_SSH: [swot_l3, swot_lr_ssh]
products:
  p:
    data_type: L3_LR_SSH
    catalog_path: p
    filters:
      time: {}
"#,
        )
        .unwrap();

        let registry = ConventionRegistry::builtin().unwrap();
        assert!(matches!(
            config.resolve(&Product::new("p"), &registry),
            Err(GfError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            LayoutConfig::from_yaml("products: [unclosed"),
            Err(GfError::Config(_))
        ));
    }

    #[test]
    fn test_embedded_config_resolves() {
        let config = LayoutConfig::embedded().unwrap();
        let registry = ConventionRegistry::builtin().unwrap();

        assert_eq!(config.catalog_base_url, DEFAULT_CATALOG_BASE_URL);
        for product in config.products() {
            config.resolve(&product, &registry).unwrap();
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = LayoutConfig::load(&path).unwrap();
        assert_eq!(config.products().len(), 4);
        assert!(matches!(
            LayoutConfig::load(&dir.path().join("missing.yaml")),
            Err(GfError::Io(_))
        ));
    }
}
