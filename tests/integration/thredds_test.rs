//! Walking catalogs parsed from THREDDS XML documents.

use gf_convention::{ConventionRegistry, FilenameFilterer, TreeWalker};
use gf_discoverer::parse_catalog;
use gf_error::{GfError, ListingError, Result};
use gf_traits::{Listing, TreeListing};
use gf_types::Filters;
use std::collections::HashMap;

const ROOT: &str = "https://tds.mock/thredds/catalog/l3_lr_ssh/catalog.xml";

/// Serves fixed XML documents through the real catalog parser.
struct XmlCatalogs(HashMap<String, String>);

impl TreeListing for XmlCatalogs {
    fn list_children(&self, url: &str) -> Result<Listing> {
        match self.0.get(url) {
            Some(document) => parse_catalog(url, document),
            None => Err(ListingError::Status {
                url: url.to_string(),
                status: 404,
            }
            .into()),
        }
    }
}

fn folder_catalog(refs: &[(&str, &str)]) -> String {
    let refs: String = refs
        .iter()
        .map(|(title, href)| {
            format!(r#"<catalogRef xlink:href="{href}" xlink:title="{title}" name=""/>"#)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog xmlns="http://www.unidata.ucar.edu/namespaces/thredds/InvCatalog/v1.0"
         xmlns:xlink="http://www.w3.org/1999/xlink" version="1.2">
  <dataset name="l3" ID="l3">{refs}</dataset>
</catalog>"#
    )
}

fn granule(subset: &str, cycle: u32, pass: u32) -> String {
    format!("SWOT_L3_LR_SSH_{subset}_{cycle:03}_{pass:03}_20240101T000000_20240101T005959_v2.0.1.nc")
}

fn granule_catalog(folder: &str, names: &[String]) -> String {
    let datasets: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<dataset name="{name}" ID="{folder}/{name}" urlPath="{folder}/{name}"><dataSize units="Mbytes">12.5</dataSize></dataset>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog xmlns="http://www.unidata.ucar.edu/namespaces/thredds/InvCatalog/v1.0" version="1.2">
  <service name="all" serviceType="Compound" base="">
    <service name="odap" serviceType="OpenDAP" base="/thredds/dodsC/"/>
    <service name="http" serviceType="HTTPServer" base="/thredds/fileServer/"/>
  </service>
  <dataset name="{folder}" ID="{folder}">{datasets}</dataset>
</catalog>"#
    )
}

fn catalogs() -> XmlCatalogs {
    let base = "https://tds.mock/thredds/catalog/l3_lr_ssh";
    let mut documents = HashMap::new();
    documents.insert(
        ROOT.to_string(),
        folder_catalog(&[("Basic", "Basic/catalog.xml"), ("Expert", "Expert/catalog.xml")]),
    );
    for subset in ["Basic", "Expert"] {
        documents.insert(
            format!("{base}/{subset}/catalog.xml"),
            folder_catalog(&[
                ("cycle_007", "cycle_007/catalog.xml"),
                ("cycle_008", "cycle_008/catalog.xml"),
            ]),
        );
        for cycle in [7, 8] {
            let folder = format!("l3_lr_ssh/{subset}/cycle_{cycle:03}");
            let names: Vec<String> = (1..=3).map(|pass| granule(subset, cycle, pass)).collect();
            documents.insert(
                format!("{base}/{subset}/cycle_{cycle:03}/catalog.xml"),
                granule_catalog(&folder, &names),
            );
        }
    }
    XmlCatalogs(documents)
}

#[test]
fn test_walk_parsed_catalogs() {
    let registry = ConventionRegistry::builtin().unwrap();
    let convention = registry.convention("swot_l3").unwrap();
    let layout = registry.layout("swot_lr_ssh").unwrap();
    let catalogs = catalogs();

    let filters = Filters::new()
        .with("subset", "Expert")
        .with("cycle_number", 8)
        .with("pass_number", vec![1, 3]);
    let walker = TreeWalker::new(&catalogs, Some(layout.as_ref()));
    let table = FilenameFilterer::new(&convention, walker)
        .list(ROOT, &filters)
        .unwrap();

    assert_eq!(
        table.paths(),
        vec![
            format!(
                "https://tds.mock/thredds/fileServer/l3_lr_ssh/Expert/cycle_008/{}",
                granule("Expert", 8, 1)
            ),
            format!(
                "https://tds.mock/thredds/fileServer/l3_lr_ssh/Expert/cycle_008/{}",
                granule("Expert", 8, 3)
            ),
        ]
    );
}

#[test]
fn test_missing_catalog_aborts_walk() {
    let registry = ConventionRegistry::builtin().unwrap();
    let convention = registry.convention("swot_l3").unwrap();
    let catalogs = XmlCatalogs(HashMap::from([(
        ROOT.to_string(),
        folder_catalog(&[("Basic", "Basic/catalog.xml")]),
    )]));

    let walker = TreeWalker::new(&catalogs, None);
    let result = FilenameFilterer::new(&convention, walker).list(ROOT, &Filters::new());

    assert!(matches!(
        result,
        Err(GfError::Listing(ListingError::Status { status: 404, .. }))
    ));
}
