//! Remote folder listing trait and related types.

use gf_error::Result;

/// A leaf (granule) found in a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafEntry {
    /// Leaf identifier, matched against filename conventions
    pub name: String,
    /// Where the granule can be fetched from
    pub access: String,
}

impl LeafEntry {
    pub fn new(name: impl Into<String>, access: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: access.into(),
        }
    }
}

/// A sub-folder found in a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    /// Folder name, matched against layout conventions
    pub name: String,
    /// Address passed back to [`TreeListing::list_children`] to descend
    pub href: String,
}

impl FolderRef {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }
}

/// Contents of one folder, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub leaves: Vec<LeafEntry>,
    pub folders: Vec<FolderRef>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leaf(mut self, name: impl Into<String>, access: impl Into<String>) -> Self {
        self.leaves.push(LeafEntry::new(name, access));
        self
    }

    pub fn with_folder(mut self, name: impl Into<String>, href: impl Into<String>) -> Self {
        self.folders.push(FolderRef::new(name, href));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty() && self.folders.is_empty()
    }
}

/// Trait for remote folder listing providers.
///
/// A provider is asked for one folder at a time so callers can decide, from
/// the folder name alone, whether a sub-folder is worth fetching. Providers
/// impose their own timeouts and do not retry.
///
/// # Implementations
///
/// - THREDDS catalog client: one `catalog.xml` request per folder
/// - In-memory trees for tests
pub trait TreeListing: Send + Sync {
    /// Lists the leaves and sub-folders of the folder at `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - Address of the folder (the root, or a [`FolderRef::href`])
    fn list_children(&self, url: &str) -> Result<Listing>;
}
