//! Depth-first walk of remote trees with early pruning.

use gf_error::Result;
use gf_traits::{LeafEntry, TreeListing};
use gf_types::Filters;
use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::layout::{Layout, LayoutFilter};

/// A leaf reached by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedLeaf {
    /// Leaf identifier (the granule file name)
    pub name: String,
    /// Access path or URL of the granule
    pub access: String,
}

impl From<LeafEntry> for WalkedLeaf {
    fn from(entry: LeafEntry) -> Self {
        Self {
            name: entry.name,
            access: entry.access,
        }
    }
}

/// Counters of a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Folder listings requested from the provider
    pub listings_fetched: usize,
    /// Sub-folders rejected by the layout without being listed
    pub folders_pruned: usize,
    /// Leaves emitted
    pub leaves_found: usize,
}

/// Walks a remote tree, optionally pruned by a [`Layout`].
///
/// Without a layout every sub-folder is descended.
pub struct TreeWalker<'a> {
    listing: &'a dyn TreeListing,
    layout: Option<&'a Layout>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(listing: &'a dyn TreeListing, layout: Option<&'a Layout>) -> Self {
        Self { listing, layout }
    }

    pub fn layout(&self) -> Option<&'a Layout> {
        self.layout
    }

    /// Start a lazy walk from `root`.
    ///
    /// Nothing is fetched until the first item is requested.
    pub fn iter(&self, root: &str, filters: &Filters) -> Result<Walk<'a>> {
        let layout_filter = match self.layout {
            Some(layout) => Some(layout.set_filters(filters)?),
            None => {
                if !filters.is_empty() {
                    warn!(
                        "No layout configured, filters {:?} will not prune the walk",
                        filters.keys().collect::<Vec<_>>()
                    );
                }
                None
            }
        };

        debug!("Walking {} with filters {:?}", root, filters);
        Ok(Walk {
            listing: self.listing,
            layout: layout_filter,
            pending_folders: vec![(root.to_string(), 0)],
            pending_leaves: VecDeque::new(),
            stats: WalkStats::default(),
            done: false,
        })
    }

    /// Walk the whole tree and collect its leaves.
    ///
    /// Leaves of a folder come before the leaves of its sub-folders, and
    /// sub-folders are visited in listing order.
    ///
    /// # Errors
    ///
    /// The first listing failure aborts the walk and is returned as is.
    pub fn walk(&self, root: &str, filters: &Filters) -> Result<Vec<WalkedLeaf>> {
        let mut walk = self.iter(root, filters)?;
        let leaves = walk.by_ref().collect::<Result<Vec<_>>>()?;

        let stats = walk.stats();
        debug!(
            listings = stats.listings_fetched,
            pruned = stats.folders_pruned,
            leaves = stats.leaves_found,
            "Walk of {} complete",
            root
        );
        Ok(leaves)
    }
}

/// Lazy depth-first walk, see [`TreeWalker::iter`].
///
/// Yields `Err` once on the first failure, then ends.
pub struct Walk<'a> {
    listing: &'a dyn TreeListing,
    layout: Option<LayoutFilter<'a>>,
    /// Folders still to list, as (href, depth), the next one on top
    pending_folders: Vec<(String, usize)>,
    pending_leaves: VecDeque<LeafEntry>,
    stats: WalkStats,
    done: bool,
}

impl Walk<'_> {
    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// List one folder: queue its leaves and the sub-folders the layout accepts.
    fn visit(&mut self, href: &str, depth: usize) -> Result<()> {
        let listing = self.listing.list_children(href)?;
        self.stats.listings_fetched += 1;

        let mut accepted = Vec::with_capacity(listing.folders.len());
        for folder in listing.folders {
            let keep = match &self.layout {
                Some(layout) => layout.test(depth, &folder.name)?,
                None => true,
            };
            if keep {
                accepted.push((folder.href, depth + 1));
            } else {
                debug!("Ignore folder {}", folder.name);
                self.stats.folders_pruned += 1;
            }
        }

        self.pending_leaves.extend(listing.leaves);
        self.pending_folders.extend(accepted.into_iter().rev());
        Ok(())
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<WalkedLeaf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if let Some(leaf) = self.pending_leaves.pop_front() {
                self.stats.leaves_found += 1;
                return Some(Ok(leaf.into()));
            }

            let Some((href, depth)) = self.pending_folders.pop() else {
                self.done = true;
                return None;
            };

            if let Err(e) = self.visit(&href, depth) {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

impl std::iter::FusedIterator for Walk<'_> {}
