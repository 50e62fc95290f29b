//! Folder layouts of the THREDDS product trees.

use gf_error::Result;
use std::sync::Arc;

use super::definitions::{cycle_number, subset, PRODUCT_SUBSET, TIME};
use crate::convention::FilenameConvention;
use crate::field::{DateDeltaField, Span};
use crate::layout::Layout;

fn cycle_level() -> Result<FilenameConvention> {
    FilenameConvention::new(
        r"^cycle_(?P<cycle_number>\d{3})$",
        vec![cycle_number()],
        Some("cycle_{cycle_number:>03d}"),
    )
}

/// `<subset>/cycle_<NNN>/`, used by the SWOT LR SSH products.
pub fn swot_lr_ssh() -> Result<Layout> {
    let subset_pattern = format!("^(?P<subset>{})$", PRODUCT_SUBSET.join("|"));
    Ok(Layout::new(vec![
        FilenameConvention::new(&subset_pattern, vec![subset()], Some("{subset!f}"))?,
        cycle_level()?,
    ]))
}

/// `cycle_<NNN>/`.
pub fn cycles() -> Result<Layout> {
    Ok(Layout::new(vec![cycle_level()?]))
}

/// `<YYYY>/`, one folder per year.
pub fn yearly() -> Result<Layout> {
    Ok(Layout::new(vec![FilenameConvention::new(
        r"^(?P<time>\d{4})$",
        vec![Arc::new(
            DateDeltaField::new("time", &["%Y"], Span::years(1)).with_description(TIME),
        )],
        Some("{time!f}"),
    )?]))
}
