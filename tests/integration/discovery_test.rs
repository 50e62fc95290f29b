//! Discovery against an in-memory catalog tree.

use crate::common::{discoverer, sample_tree, CATALOG_BASE, FILE_SERVER};
use gf_convention::TreeWalker;
use gf_discoverer::Product;
use gf_error::GfError;
use gf_types::{Filters, Value};

fn granule(path: &str) -> String {
    format!("{FILE_SERVER}{path}")
}

fn names(urls: &[String]) -> Vec<&str> {
    urls.iter()
        .map(|url| url.rsplit('/').next().unwrap())
        .collect()
}

#[test]
fn test_product_lists_its_own_folder() {
    let discoverer = discoverer();
    let urls = discoverer
        .filter_granules(&Product::new("productA"), &Filters::new())
        .unwrap();

    assert_eq!(
        urls,
        vec![
            granule("productA_path/cycle_02/dataset_02.nc"),
            granule("productA_path/cycle_02/dataset_22.nc"),
            granule("productA_path/cycle_03/dataset_03.nc"),
            granule("productA_path/cycle_03/dataset_33.nc"),
        ]
    );

    let requested = discoverer.listing().requested();
    assert_eq!(requested[0], format!("{CATALOG_BASE}productA_path/catalog.xml"));
    assert!(!requested.contains(&format!("{CATALOG_BASE}catalog.xml")));
    assert!(!discoverer.listing().was_listed("productB_path"));
}

#[test]
fn test_cycle_filter_prunes_folders_and_files() {
    let discoverer = discoverer();
    let filters = Filters::new().with("cycle_number", 2);
    let table = discoverer
        .list_granules(&Product::new("productA"), &filters)
        .unwrap();

    assert_eq!(
        table.paths(),
        vec![
            granule("productA_path/cycle_02/dataset_02.nc"),
            granule("productA_path/cycle_02/dataset_22.nc"),
        ]
    );
    assert_eq!(
        table.column("cycle_number").unwrap(),
        vec![Some(&Value::Int(2)), Some(&Value::Int(2))]
    );
    assert!(!discoverer.listing().was_listed("cycle_03"));
}

#[test]
fn test_unmatched_filter_gives_empty_result() {
    let filters = Filters::new().with("cycle_number", 99);
    let table = discoverer()
        .list_granules(&Product::new("productA"), &filters)
        .unwrap();

    assert!(table.is_empty());
    assert_eq!(table.columns(), ["cycle_number".to_string()]);
}

#[test]
fn test_product_found_by_short_name() {
    let discoverer = discoverer();
    let product = discoverer.config().product("sample_product_b").unwrap();
    let urls = discoverer
        .filter_granules(&product, &Filters::new())
        .unwrap();

    assert_eq!(names(&urls), vec!["dataset_04.nc", "dataset_44.nc"]);
}

#[test]
fn test_root_product_includes_root_leaves() {
    let urls = discoverer()
        .filter_granules(&Product::new("all"), &Filters::new())
        .unwrap();

    assert_eq!(
        names(&urls),
        vec![
            "dataset_01.nc",
            "dataset_02.nc",
            "dataset_22.nc",
            "dataset_03.nc",
            "dataset_33.nc",
            "dataset_04.nc",
            "dataset_44.nc",
        ]
    );
}

#[test]
fn test_raw_walk_visits_every_leaf() {
    let tree = sample_tree();
    let walker = TreeWalker::new(&tree, None);
    let leaves = walker
        .walk(&format!("{CATALOG_BASE}catalog.xml"), &Filters::new())
        .unwrap();

    assert_eq!(leaves.len(), 8);
    assert_eq!(leaves[0].name, "dataset_01.nc");
    assert!(leaves.iter().any(|leaf| leaf.name == "readme.txt"));
}

#[test]
fn test_layout_filter_keeps_root_leaves() {
    let discoverer = discoverer();
    let product = Product::new("all");

    let only_a = discoverer
        .filter_granules(&product, &Filters::new().with("path_filter", "A"))
        .unwrap();
    assert_eq!(
        names(&only_a),
        vec![
            "dataset_01.nc",
            "dataset_02.nc",
            "dataset_22.nc",
            "dataset_03.nc",
            "dataset_33.nc",
        ]
    );

    let none = discoverer
        .filter_granules(&product, &Filters::new().with("path_filter", "C"))
        .unwrap();
    assert_eq!(names(&none), vec!["dataset_01.nc"]);
}

#[test]
fn test_caller_filter_overrides_product_default() {
    let discoverer = discoverer();
    let product = Product::new("subsetA");

    let defaults = discoverer
        .filter_granules(&product, &Filters::new())
        .unwrap();
    assert_eq!(defaults.len(), 5);
    assert!(!discoverer.listing().was_listed("productB_path"));

    let overridden = discoverer
        .filter_granules(&product, &Filters::new().with("path_filter", "B"))
        .unwrap();
    assert_eq!(
        names(&overridden),
        vec!["dataset_01.nc", "dataset_04.nc", "dataset_44.nc"]
    );
}

#[test]
fn test_repeated_listing_is_stable() {
    let discoverer = discoverer();
    let product = Product::new("all");
    let first = discoverer
        .filter_granules(&product, &Filters::new())
        .unwrap();
    let second = discoverer
        .filter_granules(&product, &Filters::new())
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_unknown_filter_key() {
    let filters = Filters::new().with("bogus", 1);
    let result = discoverer().filter_granules(&Product::new("productA"), &filters);

    assert!(matches!(result, Err(GfError::FileListing(_))));
}

#[test]
fn test_unknown_product() {
    let result = discoverer().filter_granules(&Product::new("productZ"), &Filters::new());

    match result {
        Err(GfError::Config(message)) => assert!(message.contains("productZ")),
        other => panic!("expected a configuration error, got {other:?}"),
    }
}
