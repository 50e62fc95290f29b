//! Sample products, conventions and catalog tree.

use gf_convention::field::{IntegerField, StringField};
use gf_convention::{ConventionRegistry, FilenameConvention, Layout};
use gf_discoverer::{GranuleDiscoverer, LayoutConfig};
use std::sync::Arc;

use super::memory::RecordingTree;

pub const CATALOG_BASE: &str = "https://tds.mock/thredds/catalog/";
pub const FILE_SERVER: &str = "https://tds.mock/thredds/fileServer/";

const LAYOUT_CONFIG: &str = r#"
catalog_base_url: https://tds.mock/thredds/catalog/
granule_discovery:
  TEST_TYPE: [test_convention, test_layout]
  TEST_CYCLES: [test_convention, test_cycles]
products:
  all:
    short_name: sample_all
    title: Sample Product
    data_type: TEST_TYPE
    catalog_path: ""
  subsetA:
    short_name: sample_subset_a
    title: Sample Subset A
    data_type: TEST_TYPE
    catalog_path: ""
    filters:
      path_filter: A
  productA:
    short_name: sample_product_a
    title: Sample Product A
    data_type: TEST_CYCLES
    catalog_path: productA_path
  productB:
    short_name: sample_product_b
    title: Sample Product B
    data_type: TEST_CYCLES
    catalog_path: productB_path
"#;

/// Granules of the sample tree, relative to the catalog base.
pub const SAMPLE_FILES: &[&str] = &[
    "dataset_01.nc",
    "productA_path/cycle_02/dataset_02.nc",
    "productA_path/cycle_02/dataset_22.nc",
    "productA_path/cycle_02/readme.txt",
    "productA_path/cycle_03/dataset_03.nc",
    "productA_path/cycle_03/dataset_33.nc",
    "productB_path/cycle_04/dataset_04.nc",
    "productB_path/cycle_04/dataset_44.nc",
];

pub fn sample_tree() -> RecordingTree {
    RecordingTree::from_files(CATALOG_BASE, FILE_SERVER, SAMPLE_FILES)
}

fn cycle_level() -> FilenameConvention {
    FilenameConvention::new(
        r"^cycle_(?P<cycle_number>\d{2})$",
        vec![Arc::new(IntegerField::new("cycle_number"))],
        Some("cycle_{cycle_number:>02d}"),
    )
    .unwrap()
}

/// `product<path_filter>_path/cycle_<NN>/`, seen from the catalog root.
pub fn test_layout() -> Layout {
    Layout::new(vec![
        FilenameConvention::new(
            r"^product(?P<path_filter>.*)_path$",
            vec![Arc::new(StringField::new("path_filter"))],
            Some("product{path_filter}_path"),
        )
        .unwrap(),
        cycle_level(),
    ])
}

/// `cycle_<NN>/`, seen from a product folder.
pub fn test_cycles() -> Layout {
    Layout::new(vec![cycle_level()])
}

/// `dataset_<NN>.nc`, the cycle number being the last digit.
pub fn test_convention() -> FilenameConvention {
    FilenameConvention::new(
        r"^dataset_\d(?P<cycle_number>\d)\.nc$",
        vec![Arc::new(IntegerField::new("cycle_number"))],
        None,
    )
    .unwrap()
}

pub fn registry() -> ConventionRegistry {
    let mut registry = ConventionRegistry::new();
    registry.register_convention("test_convention", test_convention());
    registry.register_layout("test_layout", test_layout());
    registry.register_layout("test_cycles", test_cycles());
    registry
}

pub fn discoverer() -> GranuleDiscoverer<RecordingTree> {
    GranuleDiscoverer::new(
        LayoutConfig::from_yaml(LAYOUT_CONFIG).unwrap(),
        registry(),
        sample_tree(),
    )
}
