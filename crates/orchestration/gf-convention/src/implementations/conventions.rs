//! Filename conventions of the distributed products.

use chrono::TimeDelta;
use gf_error::Result;
use gf_types::julian::cnes_reference;
use std::sync::Arc;

use super::definitions::{
    cycle_number, delay, lower_case_enum, mission, pass_number, product_level, subset,
    ACQUISITION_MODE, PRODUCTION_DATE, S1A_OWI_PRODUCT_TYPE, S1A_OWI_SLICE_POST_PROCESSING, TIME,
    UPSTREAM,
};
use crate::convention::FilenameConvention;
use crate::field::{
    CaseType, DateDeltaField, DatetimeField, FilenameField, IntegerField, JulianDayField,
    JulianDeltaField, L2VersionField, PeriodField, StringField,
};

const SWOT_L2_PATTERN: &str = r"SWOT_(?P<level>.*)_LR_SSH_(?P<subset>.*)_(?P<cycle_number>\d{3})_(?P<pass_number>\d{3})_(?P<time>\d{8}T\d{6}_\d{8}T\d{6})_(?P<version>P[I|G][A-Z]\d{1}_\d{2})\.nc";

const SWOT_L3_PATTERN: &str = r"SWOT_(?P<level>.*)_LR_SSH_(?P<subset>.*)_(?P<cycle_number>\d{3})_(?P<pass_number>\d{3})_(?P<time>\d{8}T\d{6}_\d{8}T\d{6})_v(?P<version>.*)\.nc";

const SST_PATTERN: &str =
    r"(?P<time>\d{8}\d{6})-IFR-L3S_GHRSST-SSTfnd-ODYSSEA-GLOB_010-v02\.1-fv01\.0\.nc";

const CHL_PATTERN: &str = r"(?P<time>\d{8})_cmems_obs-oc_glo_bgc-plankton_(?P<delay>.*)_(?P<level>l\d{1})(-gapfree){0,1}-(?P<upstream>olci|multi)-4km_P1D\.nc";

const GRIDDED_SLA_PATTERN: &str = r"(?P<delay>.*)_(.*)_allsat_phy_l4_(?P<time>(\d{8})|(\d{8}T\d{2}))_(?P<production_date>\d{8})\.nc";

const INTERNAL_SLA_PATTERN: &str = r"msla_oer_merged_h_(?P<date>\d{5})\.nc";

const DAC_PATTERN: &str = r"dac_dif_((\d+)days_){0,1}(?P<time>\d{5}_\d{2})\.nc";

const OHC_PATTERN: &str = r"OHC-NAQG3_v1r0_blend_s(.*)_e(.*)_c(?P<time>\d{8})(.*)\.nc";

const SWH_PATTERN: &str = r"global_vavh_l3_rt_(?P<mission>.*)_(?P<time>\d{8}T\d{6}_\d{8}T\d{6})_(?P<production_date>\d{8}T\d{6})\.nc";

const S1A_OWI_PATTERN: &str = r"s1a-(?P<acquisition_mode>.*)-owi-(?P<slice_post_processing>.*)-(?P<time>\d{8}t\d{6}-\d{8}t\d{6})-(?P<resolution>\d{6})-(?P<orbit>\d{6})_(?P<product_type>.*)\.nc";

const ERA5_PATTERN: &str = r"reanalysis-era5-single-levels_(?P<time>\d{8})\.nc";

const MUR_PATTERN: &str =
    r"(?P<time>\d{8}\d{6})-JPL-L4_GHRSST-SSTfnd-MUR-GLOB-v02\.0-fv04\.1\.nc";

const L2_NADIR_PATTERN: &str = r"SWOT_(GPN|IPN)_2PfP(?P<cycle_number>\d{3})_(?P<pass_number>\d{3})_(?P<time>\d{8}_\d{6}_\d{8}_\d{6})\.nc";

const L3_NADIR_PATTERN: &str = r"(?P<delay>.*)_global_(?P<mission>.*)_(hr_){0,1}phy_(aux_){0,1}(?P<product_level>l3)_(?P<resolution>\d+)*(hz_)*(?P<time>\d{8})_(?P<production_date>\d{8})\.nc";

fn swot_time() -> Arc<dyn FilenameField> {
    Arc::new(PeriodField::new("time", "%Y%m%dT%H%M%S", "_").with_description(TIME))
}

/// SWOT KaRIn LR L2 products.
pub fn swot_l2() -> Result<FilenameConvention> {
    FilenameConvention::new(
        SWOT_L2_PATTERN,
        vec![
            cycle_number(),
            pass_number(),
            swot_time(),
            Arc::new(product_level("level")),
            subset(),
            Arc::new(L2VersionField::new("version").with_description(
                "Composite release identifier (CRID) of the L2_LR_SSH product, such as PIC0_01.",
            )),
        ],
        Some(
            "SWOT_{level!f}_LR_SSH_{subset!f}_{cycle_number:>03d}_{pass_number:>03d}_{time!f}_{version!f}.nc",
        ),
    )
}

/// SWOT KaRIn LR L3 products.
pub fn swot_l3() -> Result<FilenameConvention> {
    FilenameConvention::new(
        SWOT_L3_PATTERN,
        vec![
            cycle_number(),
            pass_number(),
            swot_time(),
            Arc::new(product_level("level")),
            subset(),
            Arc::new(StringField::new("version").with_description(
                "Version of the L3_LR_SSH Swot product. This is a tri-number version x.y.z, \
                 where x denotes a major change in the product, y a minor change and z a fix.",
            )),
        ],
        Some(
            "SWOT_{level!f}_LR_SSH_{subset!f}_{cycle_number:>03d}_{pass_number:>03d}_{time!f}_v{version}.nc",
        ),
    )
}

/// ODYSSEA L3S sea surface temperature.
pub fn sst() -> Result<FilenameConvention> {
    FilenameConvention::new(
        SST_PATTERN,
        vec![Arc::new(
            DatetimeField::new("time", &["%Y%m%d%H%M%S"]).with_description(TIME),
        )],
        Some("{time!f}-IFR-L3S_GHRSST-SSTfnd-ODYSSEA-GLOB_010-v02.1-fv01.0.nc"),
    )
}

/// Ocean colour plankton (chlorophyll) daily products.
pub fn chl() -> Result<FilenameConvention> {
    FilenameConvention::new(
        CHL_PATTERN,
        vec![
            Arc::new(
                DateDeltaField::new("time", &["%Y%m%d"], TimeDelta::days(1)).with_description(TIME),
            ),
            delay(),
            Arc::new(
                product_level("level")
                    .with_case_type(CaseType::Upper)
                    .with_encoded_case(CaseType::Lower),
            ),
            lower_case_enum("upstream", "Upstream", UPSTREAM, "Upstream."),
        ],
        None,
    )
}

/// Gridded sea level anomalies (L4).
pub fn gridded_sla() -> Result<FilenameConvention> {
    FilenameConvention::new(
        GRIDDED_SLA_PATTERN,
        vec![
            delay(),
            Arc::new(
                DateDeltaField::new("time", &["%Y%m%d", "%Y%m%dT%H"], TimeDelta::days(1))
                    .with_description(TIME),
            ),
            Arc::new(
                DatetimeField::new("production_date", &["%Y%m%d"])
                    .with_description(PRODUCTION_DATE),
            ),
        ],
        None,
    )
}

/// Internal daily gridded sea level anomalies dated in CNES julian days.
pub fn gridded_sla_internal() -> Result<FilenameConvention> {
    FilenameConvention::new(
        INTERNAL_SLA_PATTERN,
        vec![Arc::new(
            JulianDeltaField::new("date", cnes_reference(), TimeDelta::days(1))
                .with_description(TIME),
        )],
        Some("msla_oer_merged_h_{date!f}.nc"),
    )
}

/// Dynamic atmospheric correction, dated in CNES julian days and hours.
pub fn dac() -> Result<FilenameConvention> {
    FilenameConvention::new(
        DAC_PATTERN,
        vec![Arc::new(JulianDayField::new("time", cnes_reference()))],
        Some("dac_dif_{time!f}.nc"),
    )
}

/// Ocean heat content.
pub fn ohc() -> Result<FilenameConvention> {
    FilenameConvention::new(
        OHC_PATTERN,
        vec![Arc::new(
            DatetimeField::new("time", &["%Y%m%d"]).with_description(TIME),
        )],
        None,
    )
}

/// Near real time significant wave height (L3).
pub fn swh() -> Result<FilenameConvention> {
    FilenameConvention::new(
        SWH_PATTERN,
        vec![
            mission(),
            swot_time(),
            Arc::new(
                DatetimeField::new("production_date", &["%Y%m%dT%H%M%S"])
                    .with_description(PRODUCTION_DATE),
            ),
        ],
        Some("global_vavh_l3_rt_{mission!f}_{time!f}_{production_date!f}.nc"),
    )
}

/// Sentinel-1A ocean wind (OWI) L2 products.
pub fn s1a_owi() -> Result<FilenameConvention> {
    FilenameConvention::new(
        S1A_OWI_PATTERN,
        vec![
            lower_case_enum(
                "acquisition_mode",
                "AcquisitionMode",
                ACQUISITION_MODE,
                "Acquisition mode.",
            ),
            lower_case_enum(
                "slice_post_processing",
                "S1AOWISlicePostProcessing",
                S1A_OWI_SLICE_POST_PROCESSING,
                "Slices post-processing.",
            ),
            Arc::new(PeriodField::new("time", "%Y%m%dt%H%M%S", "-").with_description(TIME)),
            Arc::new(
                IntegerField::new("resolution")
                    .with_description("SAR Ocean surface wind Level-2 product resolution."),
            ),
            Arc::new(IntegerField::new("orbit").with_description("Orbit number")),
            lower_case_enum(
                "product_type",
                "S1AOWIProductType",
                S1A_OWI_PRODUCT_TYPE,
                "Product type.",
            ),
        ],
        Some(
            "s1a-{acquisition_mode!f}-owi-{slice_post_processing!f}-{time!f}-{resolution:>06d}-{orbit:>06d}_{product_type!f}.nc",
        ),
    )
}

/// ERA5 single level reanalysis.
pub fn era5() -> Result<FilenameConvention> {
    FilenameConvention::new(
        ERA5_PATTERN,
        vec![Arc::new(
            DatetimeField::new("time", &["%Y%m%d"]).with_description(TIME),
        )],
        Some("reanalysis-era5-single-levels_{time!f}.nc"),
    )
}

/// MUR L4 sea surface temperature.
pub fn mur() -> Result<FilenameConvention> {
    FilenameConvention::new(
        MUR_PATTERN,
        vec![Arc::new(
            DatetimeField::new("time", &["%Y%m%d%H%M%S"]).with_description(TIME),
        )],
        Some("{time!f}-JPL-L4_GHRSST-SSTfnd-MUR-GLOB-v02.0-fv04.1.nc"),
    )
}

/// SWOT nadir altimeter L2 products.
pub fn l2_nadir() -> Result<FilenameConvention> {
    FilenameConvention::new(
        L2_NADIR_PATTERN,
        vec![
            cycle_number(),
            pass_number(),
            Arc::new(PeriodField::new("time", "%Y%m%d_%H%M%S", "_").with_description(TIME)),
        ],
        None,
    )
}

/// Along-track nadir L3 sea level products.
pub fn l3_nadir() -> Result<FilenameConvention> {
    FilenameConvention::new(
        L3_NADIR_PATTERN,
        vec![
            delay(),
            Arc::new(
                DateDeltaField::new("time", &["%Y%m%d"], TimeDelta::days(1)).with_description(TIME),
            ),
            Arc::new(
                DatetimeField::new("production_date", &["%Y%m%d"])
                    .with_description(PRODUCTION_DATE),
            ),
            mission(),
            Arc::new(product_level("product_level").with_case_type(CaseType::Upper)),
            Arc::new(
                IntegerField::new("resolution")
                    .with_default(1)
                    .with_description(
                        "Data resolution. Nadir products may be sampled at 1Hz, 5Hz or 20Hz \
                         depending on the level and dataset considered.",
                    ),
            ),
        ],
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_filter::RecordFilter;
    use chrono::NaiveDate;
    use gf_error::GfError;
    use gf_types::{Filters, Period, Reference, Value};
    use std::collections::HashMap;

    fn instant(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn values(convention: &FilenameConvention, record: Vec<Option<Value>>) -> HashMap<String, Value> {
        convention
            .field_names()
            .map(str::to_string)
            .zip(record)
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }

    #[test]
    fn test_all_conventions_build() {
        for build in [
            swot_l2, swot_l3, sst, chl, gridded_sla, gridded_sla_internal, dac, ohc, swh, s1a_owi,
            era5, mur, l2_nadir, l3_nadir,
        ] {
            build().unwrap();
        }
    }

    #[test]
    fn test_swot_l3_round_trip() {
        let convention = swot_l3().unwrap();
        let name = "SWOT_L3_LR_SSH_Expert_012_345_20240101T000000_20240101T010000_v1.0.2.nc";
        let record = convention.parse_filename(name).unwrap().unwrap();

        assert_eq!(record[0], Some(Value::Int(12)));
        assert_eq!(record[1], Some(Value::Int(345)));
        assert_eq!(
            record[2],
            Some(Value::Period(Period::new(
                instant(2024, 1, 1, 0, 0, 0),
                instant(2024, 1, 1, 1, 0, 0)
            )))
        );
        assert_eq!(record[3], Some(Value::Enum("L3".to_string())));
        assert_eq!(record[4], Some(Value::Enum("Expert".to_string())));
        assert_eq!(record[5], Some(Value::from("1.0.2")));

        assert_eq!(convention.generate(&values(&convention, record)).unwrap(), name);
    }

    #[test]
    fn test_swot_l2_version() {
        let convention = swot_l2().unwrap();
        let name = "SWOT_L2_LR_SSH_Basic_001_002_20230101T000000_20230101T005000_PIC0_01.nc";
        let record = convention.parse_filename(name).unwrap().unwrap();
        assert_eq!(record[5], Some(Value::from("PIC0_01")));
        assert_eq!(convention.generate(&values(&convention, record)).unwrap(), name);

        let malformed = "SWOT_L2_LR_SSH_Basic_001_002_20230101T000000_20230101T005000_P|C0_01.nc";
        assert!(matches!(
            convention.parse_filename(malformed),
            Err(GfError::Parsing(_))
        ));

        let mut bad_values = values(&convention, convention.parse_filename(name).unwrap().unwrap());
        bad_values.insert("version".to_string(), Value::from("v1.0"));
        assert!(convention.generate(&bad_values).is_err());
    }

    #[test]
    fn test_swot_l2_version_filter() {
        let convention = swot_l2().unwrap();
        let filter = RecordFilter::new(convention.fields(), &Filters::new().with("version", "PIC")).unwrap();

        let forward = convention
            .parse_filename("SWOT_L2_LR_SSH_Expert_004_010_20230101T000000_20230101T005000_PIC2_01.nc")
            .unwrap()
            .unwrap();
        let reprocessed = convention
            .parse_filename("SWOT_L2_LR_SSH_Expert_004_010_20230101T000000_20230101T005000_PGC0_01.nc")
            .unwrap()
            .unwrap();
        assert!(filter.test(&forward));
        assert!(!filter.test(&reprocessed));
    }

    #[test]
    fn test_chl_lower_case_enums() {
        let convention = chl().unwrap();
        let record = convention
            .parse_filename("20240315_cmems_obs-oc_glo_bgc-plankton_nrt_l3-olci-4km_P1D.nc")
            .unwrap()
            .unwrap();
        assert_eq!(record[1], Some(Value::Enum("NRT".to_string())));
        assert_eq!(record[2], Some(Value::Enum("L3".to_string())));
        assert_eq!(record[3], Some(Value::Enum("OLCI".to_string())));

        let gapfree = convention
            .parse_filename("20240315_cmems_obs-oc_glo_bgc-plankton_my_l4-gapfree-multi-4km_P1D.nc")
            .unwrap()
            .unwrap();
        assert_eq!(gapfree[1], Some(Value::Enum("MY".to_string())));
    }

    #[test]
    fn test_gridded_sla_time_formats() {
        let convention = gridded_sla().unwrap();
        let daily = convention
            .parse_filename("nrt_europe_allsat_phy_l4_20240101_20240107.nc")
            .unwrap()
            .unwrap();
        let hourly = convention
            .parse_filename("nrt_europe_allsat_phy_l4_20240101T06_20240107.nc")
            .unwrap()
            .unwrap();
        let start = |record: &Vec<Option<Value>>| record[1].as_ref().unwrap().as_period().unwrap().start;
        assert_eq!(start(&daily), instant(2024, 1, 1, 0, 0, 0));
        assert_eq!(start(&hourly), instant(2024, 1, 1, 6, 0, 0));
    }

    #[test]
    fn test_dac_julian_days() {
        let convention = dac().unwrap();
        let record = convention
            .parse_filename("dac_dif_27028_06.nc")
            .unwrap()
            .unwrap();
        assert_eq!(record[0], Some(Value::DateTime(instant(2024, 1, 1, 6, 0, 0))));
        assert_eq!(
            convention.generate(&values(&convention, record)).unwrap(),
            "dac_dif_27028_06.nc"
        );
        assert!(convention
            .parse_filename("dac_dif_10days_27028_06.nc")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_gridded_sla_internal_round_trip() {
        let convention = gridded_sla_internal().unwrap();
        let name = "msla_oer_merged_h_27028.nc";
        let record = convention.parse_filename(name).unwrap().unwrap();
        assert_eq!(
            record[0].as_ref().unwrap().as_period().unwrap().start,
            instant(2024, 1, 1, 0, 0, 0)
        );
        assert_eq!(convention.generate(&values(&convention, record)).unwrap(), name);
    }

    #[test]
    fn test_s1a_owi_round_trip() {
        let convention = s1a_owi().unwrap();
        let name = "s1a-iw-owi-cm-20240101t101010-20240101t101040-000003-051234_sw.nc";
        let record = convention.parse_filename(name).unwrap().unwrap();
        assert_eq!(record[0], Some(Value::Enum("IW".to_string())));
        assert_eq!(record[3], Some(Value::Int(3)));
        assert_eq!(convention.generate(&values(&convention, record)).unwrap(), name);
    }

    #[test]
    fn test_l3_nadir_default_resolution() {
        let convention = l3_nadir().unwrap();
        let record = convention
            .parse_filename("nrt_global_j3n_phy_l3_20240101_20240107.nc")
            .unwrap()
            .unwrap();
        assert_eq!(record[0], Some(Value::Enum("NRT".to_string())));
        assert_eq!(record[3], Some(Value::Enum("j3n".to_string())));
        assert_eq!(record[4], Some(Value::Enum("L3".to_string())));
        assert_eq!(record[5], Some(Value::Int(1)));

        let sampled = convention
            .parse_filename("nrt_global_s6a_phy_l3_20hz_20240101_20240107.nc")
            .unwrap()
            .unwrap();
        assert_eq!(sampled[3], Some(Value::Enum("s6a".to_string())));
        assert_eq!(sampled[5], Some(Value::Int(20)));
    }

    #[test]
    fn test_l3_nadir_filtering() {
        let convention = l3_nadir().unwrap();
        let filters = Filters::new()
            .with("mission", vec!["j3n", "s6a"])
            .with("time", Reference::between("2024-01-01", "2024-01-02"));
        let filter = RecordFilter::new(convention.fields(), &filters).unwrap();

        let keep = convention
            .parse_filename("nrt_global_j3n_phy_l3_20240101_20240107.nc")
            .unwrap()
            .unwrap();
        let other_mission = convention
            .parse_filename("nrt_global_al_phy_l3_20240101_20240107.nc")
            .unwrap()
            .unwrap();
        let other_day = convention
            .parse_filename("nrt_global_j3n_phy_l3_20240110_20240117.nc")
            .unwrap()
            .unwrap();
        assert!(filter.test(&keep));
        assert!(!filter.test(&other_mission));
        assert!(!filter.test(&other_day));
    }

    #[test]
    fn test_swh_round_trip() {
        let convention = swh().unwrap();
        let name = "global_vavh_l3_rt_s6a_20240101T000000_20240101T030000_20240101T050000.nc";
        let record = convention.parse_filename(name).unwrap().unwrap();
        assert_eq!(record[0], Some(Value::Enum("s6a".to_string())));
        assert_eq!(convention.generate(&values(&convention, record)).unwrap(), name);
    }
}
