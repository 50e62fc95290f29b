//! THREDDS Data Server catalog client.
//!
//! Each folder of a THREDDS tree is a `catalog.xml` document. Granules are
//! `dataset` elements carrying a `urlPath`, sub-folders are `catalogRef`
//! elements pointing at the next catalog.

use gf_error::{GfError, ListingError, Result};
use gf_traits::{Listing, TreeListing};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fmt::Display;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Service type whose base gives direct file access.
const FILE_SERVICE_TYPE: &str = "HTTPServer";

/// Configuration of the THREDDS client.
#[derive(Debug, Clone)]
pub struct ThreddsConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ThreddsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("granule-fetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ThreddsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Lists THREDDS catalogs over HTTP, one blocking request per folder.
pub struct ThreddsCatalog {
    client: reqwest::blocking::Client,
}

impl ThreddsCatalog {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &ThreddsConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GfError::Config(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl TreeListing for ThreddsCatalog {
    fn list_children(&self, url: &str) -> Result<Listing> {
        debug!(url, "Fetching catalog");

        let response = self.client.get(url).send().map_err(|e| ListingError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().map_err(|e| ListingError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        parse_catalog(url, &body)
    }
}

fn malformed(url: &str, error: impl Display) -> GfError {
    ListingError::Malformed {
        url: url.to_string(),
        message: error.to_string(),
    }
    .into()
}

fn attributes(url: &str, element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| malformed(url, e))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| malformed(url, e))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

/// Parse a `catalog.xml` document fetched from `url`.
///
/// Leaves are named after the last segment of their `urlPath` and point at
/// the file server. Folders are named after their `xlink:title` (or the
/// `name` attribute) and point at the absolute URL of their catalog.
pub fn parse_catalog(url: &str, document: &str) -> Result<Listing> {
    let catalog_url = Url::parse(url).map_err(|_| ListingError::InvalidUrl(url.to_string()))?;

    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut file_service: Option<String> = None;
    let mut url_paths: Vec<String> = Vec::new();
    let mut listing = Listing::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                match element.local_name().as_ref() {
                    b"service" => {
                        let attrs = attributes(url, &element)?;
                        let is_file_service = attrs
                            .get("serviceType")
                            .is_some_and(|t| t.eq_ignore_ascii_case(FILE_SERVICE_TYPE));
                        if is_file_service && file_service.is_none() {
                            file_service = attrs.get("base").cloned();
                        }
                    }
                    b"dataset" => {
                        let mut attrs = attributes(url, &element)?;
                        if let Some(url_path) = attrs.remove("urlPath") {
                            url_paths.push(url_path);
                        }
                    }
                    b"catalogRef" => {
                        let attrs = attributes(url, &element)?;
                        let Some(href) = attrs.get("href") else {
                            return Err(malformed(url, "catalogRef without href"));
                        };
                        let target = catalog_url
                            .join(href)
                            .map_err(|_| ListingError::InvalidUrl(href.clone()))?;
                        let name = attrs
                            .get("title")
                            .or_else(|| attrs.get("name"))
                            .filter(|n| !n.is_empty())
                            .cloned()
                            .unwrap_or_else(|| folder_name_from_href(href));
                        listing = listing.with_folder(name, target.to_string());
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(url, e)),
        }
    }

    if !url_paths.is_empty() {
        let Some(base) = file_service else {
            return Err(malformed(
                url,
                format!("datasets found but no {FILE_SERVICE_TYPE} service declared"),
            ));
        };
        let mut base = catalog_url
            .join(&base)
            .map_err(|_| ListingError::InvalidUrl(base.clone()))?
            .to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        for url_path in url_paths {
            let url_path = url_path.trim_start_matches('/');
            let name = url_path.rsplit('/').next().unwrap_or(url_path);
            listing = listing.with_leaf(name, format!("{base}{url_path}"));
        }
    }

    debug!(
        url,
        leaves = listing.leaves.len(),
        folders = listing.folders.len(),
        "Parsed catalog"
    );
    Ok(listing)
}

/// `Basic/catalog.xml` -> `Basic`.
fn folder_name_from_href(href: &str) -> String {
    href.trim_end_matches("catalog.xml")
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(href)
        .to_string()
}
