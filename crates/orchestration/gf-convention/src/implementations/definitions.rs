//! Symbol sets and shared field definitions of the built-in conventions.

use std::sync::Arc;

use crate::field::{CaseType, EnumField, FilenameField, IntegerField};

pub const PRODUCT_LEVEL: &[&str] = &["L1A", "L1B", "L2", "L3", "L4"];

pub const DELAY: &[&str] = &["NRT", "DT", "MY", "MYINT"];

pub const UPSTREAM: &[&str] = &["OLCI", "MULTI"];

pub const ACQUISITION_MODE: &[&str] = &["IW", "EW", "WV", "SM"];

pub const S1A_OWI_PRODUCT_TYPE: &[&str] = &["SW", "GS"];

pub const S1A_OWI_SLICE_POST_PROCESSING: &[&str] = &["CC", "CM", "OCN"];

/// Subsets of the SWOT LR products.
pub const PRODUCT_SUBSET: &[&str] = &["Basic", "Expert", "Unsmoothed", "WindWave", "Technical", "Light"];

/// Altimetry missions and mission phases, as written in nadir file names.
pub const MISSION: &[&str] = &[
    "al", "alg", "c2", "c2n", "e1", "e2", "en", "enn", "g2", "h2a", "h2ag", "h2b", "h2c", "j1",
    "j1g", "j1n", "j2", "j2g", "j2n", "j3", "j3n", "s3a", "s3b", "s6a",
];

pub const CYCLE_NUMBER: &str = "Cycle number of the half orbit. A half orbit is identified \
                                using a cycle number and a pass number.";

pub const PASS_NUMBER: &str = "Pass number of the half orbit. A half orbit is identified \
                               using a cycle number and a pass number.";

pub const TIME: &str = "Period covered by the file.";

pub const LEVEL: &str = "Product level of the data.";

pub const SUBSET: &str = "Subset of the LR Karin products. The Basic and Expert subsets are \
                          defined on a reference grid, opening the possibility of stacking the \
                          files, whereas the Unsmoothed subset is defined on a different grid \
                          for each cycle.";

pub const PRODUCTION_DATE: &str = "Production date of a given file. The same granule is \
                                   regenerated multiple times with updated corrections. Hence \
                                   there can be multiple files for the same period, but with a \
                                   different production date.";

pub const MISSION_DESCRIPTION: &str = "Altimetry mission in the file.";

pub fn cycle_number() -> Arc<dyn FilenameField> {
    Arc::new(IntegerField::new("cycle_number").with_description(CYCLE_NUMBER))
}

pub fn pass_number() -> Arc<dyn FilenameField> {
    Arc::new(IntegerField::new("pass_number").with_description(PASS_NUMBER))
}

pub fn product_level(name: &str) -> EnumField {
    EnumField::new(name, "ProductLevel", PRODUCT_LEVEL).with_description(LEVEL)
}

pub fn subset() -> Arc<dyn FilenameField> {
    Arc::new(EnumField::new("subset", "ProductSubset", PRODUCT_SUBSET).with_description(SUBSET))
}

pub fn mission() -> Arc<dyn FilenameField> {
    Arc::new(EnumField::new("mission", "Mission", MISSION).with_description(MISSION_DESCRIPTION))
}

/// Delay field written in lower case, like `nrt` or `my`.
pub fn delay() -> Arc<dyn FilenameField> {
    Arc::new(
        EnumField::new("delay", "Delay", DELAY)
            .with_case_type(CaseType::Upper)
            .with_encoded_case(CaseType::Lower)
            .with_description("Delay."),
    )
}

/// Enumeration written in lower case in file names.
pub fn lower_case_enum(
    name: &str,
    type_name: &str,
    members: &[&str],
    description: &str,
) -> Arc<dyn FilenameField> {
    Arc::new(
        EnumField::new(name, type_name, members)
            .with_case_type(CaseType::Upper)
            .with_encoded_case(CaseType::Lower)
            .with_description(description),
    )
}
