//! Built-in conventions and layouts, and the registry resolving them by name.

pub mod conventions;
pub mod definitions;
pub mod layouts;

use gf_error::{GfError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::convention::FilenameConvention;
use crate::layout::Layout;

/// Conventions and layouts addressable by name from configuration files.
#[derive(Debug, Clone, Default)]
pub struct ConventionRegistry {
    conventions: BTreeMap<String, Arc<FilenameConvention>>,
    layouts: BTreeMap<String, Arc<Layout>>,
}

impl ConventionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in convention and layout.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();

        let builders: [(&str, fn() -> Result<FilenameConvention>); 14] = [
            ("swot_l2", conventions::swot_l2),
            ("swot_l3", conventions::swot_l3),
            ("sst", conventions::sst),
            ("chl", conventions::chl),
            ("gridded_sla", conventions::gridded_sla),
            ("gridded_sla_internal", conventions::gridded_sla_internal),
            ("dac", conventions::dac),
            ("ohc", conventions::ohc),
            ("swh", conventions::swh),
            ("s1a_owi", conventions::s1a_owi),
            ("era5", conventions::era5),
            ("mur", conventions::mur),
            ("l2_nadir", conventions::l2_nadir),
            ("l3_nadir", conventions::l3_nadir),
        ];
        for (name, build) in builders {
            registry.register_convention(name, build()?);
        }

        registry.register_layout("swot_lr_ssh", layouts::swot_lr_ssh()?);
        registry.register_layout("cycles", layouts::cycles()?);
        registry.register_layout("yearly", layouts::yearly()?);

        debug!(
            conventions = registry.conventions.len(),
            layouts = registry.layouts.len(),
            "Loaded built-in convention registry"
        );
        Ok(registry)
    }

    /// Adds (or replaces) a convention.
    pub fn register_convention(&mut self, name: impl Into<String>, convention: FilenameConvention) {
        self.conventions.insert(name.into(), Arc::new(convention));
    }

    /// Adds (or replaces) a layout.
    pub fn register_layout(&mut self, name: impl Into<String>, layout: Layout) {
        self.layouts.insert(name.into(), Arc::new(layout));
    }

    /// Gets a convention by name.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] for an unknown name.
    pub fn convention(&self, name: &str) -> Result<Arc<FilenameConvention>> {
        self.conventions.get(name).cloned().ok_or_else(|| {
            GfError::Config(format!(
                "Unknown convention '{name}'. Available conventions: {:?}",
                self.conventions.keys().collect::<Vec<_>>()
            ))
        })
    }

    /// Gets a layout by name.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] for an unknown name.
    pub fn layout(&self, name: &str) -> Result<Arc<Layout>> {
        self.layouts.get(name).cloned().ok_or_else(|| {
            GfError::Config(format!(
                "Unknown layout '{name}'. Available layouts: {:?}",
                self.layouts.keys().collect::<Vec<_>>()
            ))
        })
    }

    /// Conventions sorted by name.
    pub fn conventions(&self) -> impl Iterator<Item = (&str, &FilenameConvention)> {
        self.conventions.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Layouts sorted by name.
    pub fn layouts(&self) -> impl Iterator<Item = (&str, &Layout)> {
        self.layouts.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}
