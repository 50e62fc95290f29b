//! Recording in-memory catalog tree and fake file server.

use async_trait::async_trait;
use gf_error::{DownloadError, Result};
use gf_traits::{GranuleFetcher, Listing, TreeListing};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

/// A catalog tree laid out like a THREDDS server: every folder is listed at
/// `<base><folder>/catalog.xml`. Every requested URL is recorded.
pub struct RecordingTree {
    catalogs: HashMap<String, Listing>,
    requested: Mutex<Vec<String>>,
}

impl RecordingTree {
    /// Build the tree holding `files`, given relative to `catalog_base`.
    pub fn from_files(catalog_base: &str, file_server: &str, files: &[&str]) -> Self {
        let catalog_url = |folder: &str| {
            if folder.is_empty() {
                format!("{catalog_base}catalog.xml")
            } else {
                format!("{catalog_base}{folder}/catalog.xml")
            }
        };

        // folder -> (sub-folders, leaves), sorted for a stable provider order
        let mut folders: BTreeMap<String, (Vec<String>, Vec<String>)> = BTreeMap::new();
        folders.entry(String::new()).or_default();
        let mut seen = HashSet::new();

        for file in files {
            let (folder, name) = file.rsplit_once('/').unwrap_or(("", file));
            folders
                .entry(folder.to_string())
                .or_default()
                .1
                .push(name.to_string());

            let mut child = folder.to_string();
            while !child.is_empty() && seen.insert(child.clone()) {
                let parent = child.rsplit_once('/').map(|(p, _)| p).unwrap_or("").to_string();
                folders.entry(parent.clone()).or_default().0.push(child.clone());
                folders.entry(child.clone()).or_default();
                child = parent;
            }
        }

        let catalogs = folders
            .into_iter()
            .map(|(folder, (mut children, leaves))| {
                children.sort();
                let mut listing = Listing::new();
                for child in children {
                    let name = child.rsplit('/').next().unwrap_or(&child).to_string();
                    listing = listing.with_folder(name, catalog_url(&child));
                }
                for leaf in leaves {
                    let path = if folder.is_empty() {
                        leaf.clone()
                    } else {
                        format!("{folder}/{leaf}")
                    };
                    listing = listing.with_leaf(leaf, format!("{file_server}{path}"));
                }
                (catalog_url(&folder), listing)
            })
            .collect();

        Self {
            catalogs,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// URLs listed so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Whether any listed URL contains `fragment`.
    pub fn was_listed(&self, fragment: &str) -> bool {
        self.requested().iter().any(|url| url.contains(fragment))
    }
}

impl TreeListing for RecordingTree {
    fn list_children(&self, url: &str) -> Result<Listing> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(self.catalogs.get(url).cloned().unwrap_or_default())
    }
}

/// File server serving fixed bodies. Unknown URLs answer 404, URLs marked
/// flaky answer 503 a given number of times before succeeding.
#[derive(Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    flaky: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: &[u8]) -> Self {
        self.bodies.insert(url.into(), body.to_vec());
        self
    }

    pub fn with_failures(self, url: impl Into<String>, failures: u32) -> Self {
        self.flaky.lock().unwrap().insert(url.into(), failures);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GranuleFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        self.calls.lock().unwrap().push(url.to_string());

        let transient = {
            let mut flaky = self.flaky.lock().unwrap();
            match flaky.get_mut(url) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if transient {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: 503,
            }
            .into());
        }

        let Some(body) = self.bodies.get(url) else {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: 404,
            }
            .into());
        };
        tokio::fs::write(destination, body).await?;
        Ok(body.len() as u64)
    }
}
