//! CLI argument definitions for gf.

use clap::{Args, Parser, Subcommand, ValueEnum};
use gf_cli_common::LogLevel;
use std::path::PathBuf;

/// Discover and download data granules from the AVISO THREDDS Data Server.
///
/// Granules are selected by filtering the fields encoded in their file names.
/// Folders of the catalog tree that cannot hold a selected granule are never
/// listed.
///
/// ## Examples
///
/// List the configured products:
///   gf products
///
/// Show the fields a product can be filtered on:
///   gf details SWOT_L3_LR_SSH_EXPERT
///
/// List the granules of two cycles:
///   gf list SWOT_L3_LR_SSH_EXPERT --cycle 7,8 --pass 1-20
///
/// Download a time window:
///   gf get SWOT_L3_LR_SSH_BASIC -o ./granules --start 2024-01-01 --end 2024-01-08
///
/// Any field of the product convention can be filtered:
///   gf list SWOT_L3_LR_SSH_BASIC -f version=1.0.2 -f "time=2024-01-01..2024-02-01"
#[derive(Parser, Debug)]
#[command(name = "gf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Product layout configuration (YAML); the embedded one is used otherwise
    #[arg(long, global = true, env = "GF_LAYOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the catalog base URL of the layout configuration
    #[arg(long, global = true, env = "GF_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// HTTP timeout in seconds for catalog requests
    #[arg(long, global = true, default_value = "30", value_parser = parse_positive_u64)]
    pub timeout: u64,

    /// Log level
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the configured products
    Products,

    /// Describe one product: catalog location, default filters and fields
    Details {
        /// Product id or short name
        product: String,
    },

    /// Describe the built-in filename conventions and their fields
    Conventions {
        /// Only describe this convention
        name: Option<String>,
    },

    /// Print the granules of a product passing the filters
    List {
        #[command(flatten)]
        selection: Selection,

        /// Output format
        #[arg(long, value_enum, default_value = "jsonl")]
        output_format: OutputFormatArg,
    },

    /// Download the granules of a product passing the filters
    Get {
        #[command(flatten)]
        selection: Selection,

        /// Directory receiving the granules
        #[arg(short, long, env = "GF_OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Download again granules already present in the output directory
        #[arg(long)]
        overwrite: bool,

        /// Maximum concurrent downloads (must be >= 1)
        #[arg(long, default_value = "4", value_parser = parse_positive_usize)]
        concurrency: usize,

        /// Retries of a transfer failing with a transient error
        #[arg(long, default_value = "3")]
        retries: u32,

        /// Timeout in seconds of one granule transfer
        #[arg(long, default_value = "600", value_parser = parse_positive_u64)]
        download_timeout: u64,

        /// .netrc file holding the file server credentials (default: ~/.netrc)
        #[arg(long, env = "GF_NETRC")]
        netrc: Option<PathBuf>,
    },
}

/// Product and filters of a granule selection.
#[derive(Args, Debug, Clone)]
pub struct Selection {
    /// Product id or short name
    pub product: String,

    /// Field filter (can be specified multiple times)
    ///
    /// Supports three formats:
    /// - Value: "field=value"
    /// - Membership: "field=value1,value2"
    /// - Bounds: "field=start..stop", either side may be empty
    #[arg(long = "filter", short = 'f')]
    pub filters: Vec<String>,

    /// Cycle numbers, e.g. "7,8,12-14"
    #[arg(long, value_parser = parse_int_list)]
    pub cycle: Option<IntList>,

    /// Pass numbers, e.g. "1-20,35"
    #[arg(long, value_parser = parse_int_list)]
    pub pass: Option<IntList>,

    /// Start of the time window (ISO 8601, or relative like -7d)
    #[arg(long)]
    pub start: Option<String>,

    /// End of the time window
    #[arg(long)]
    pub end: Option<String>,
}

/// Integers given as comma separated values and inclusive ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntList(pub Vec<i64>);

/// Output format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// JSON Lines (one JSON object per granule)
    Jsonl,
    /// Pretty-printed JSON array
    Json,
    /// Granule URLs only, one per line
    Urls,
}

/// Parse "7,8,12-14" into [7, 8, 12, 13, 14].
pub fn parse_int_list(s: &str) -> Result<IntList, String> {
    let mut values = Vec::new();
    for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        let parse = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| format!("'{v}' is not a valid integer"))
        };
        match item.split_once('-') {
            Some((start, stop)) if !start.trim().is_empty() => {
                let (start, stop) = (parse(start)?, parse(stop)?);
                if stop < start {
                    return Err(format!("Range '{item}' ends before it starts"));
                }
                values.extend(start..=stop);
            }
            _ => values.push(parse(item)?),
        }
    }
    if values.is_empty() {
        return Err(format!("No value in '{s}'"));
    }
    Ok(IntList(values))
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value == 0 {
        return Err("value must be at least 1".to_string());
    }
    Ok(value)
}

/// Parse a positive u64 (>= 1).
fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value == 0 {
        return Err("value must be at least 1".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_list() {
        assert_eq!(parse_int_list("7").unwrap(), IntList(vec![7]));
        assert_eq!(
            parse_int_list("7,8,12-14").unwrap(),
            IntList(vec![7, 8, 12, 13, 14])
        );
        assert_eq!(parse_int_list(" 1 - 2 , 5").unwrap(), IntList(vec![1, 2, 5]));
        assert_eq!(parse_int_list("-3").unwrap(), IntList(vec![-3]));
    }

    #[test]
    fn test_parse_int_list_errors() {
        assert!(parse_int_list("").is_err());
        assert!(parse_int_list("a").is_err());
        assert!(parse_int_list("5-2").is_err());
        assert!(parse_int_list("1-x").is_err());
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive_usize("4").unwrap(), 4);
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_u64("abc").is_err());
    }

    #[test]
    fn test_cli_list() {
        let cli = Cli::try_parse_from([
            "gf", "list", "productA", "-f", "subset=Basic", "--cycle", "1-3", "--output-format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::List {
                selection,
                output_format,
            } => {
                assert_eq!(selection.product, "productA");
                assert_eq!(selection.filters, vec!["subset=Basic"]);
                assert_eq!(selection.cycle, Some(IntList(vec![1, 2, 3])));
                assert_eq!(output_format, OutputFormatArg::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_get_requires_output_dir() {
        let result = Cli::try_parse_from(["gf", "get", "productA"]);
        if std::env::var_os("GF_OUTPUT_DIR").is_none() {
            assert!(result.is_err());
        }

        let cli = Cli::try_parse_from([
            "gf", "get", "productA", "-o", "out", "--concurrency", "8", "--overwrite",
        ])
        .unwrap();
        match cli.command {
            Command::Get {
                output_dir,
                concurrency,
                overwrite,
                ..
            } => {
                assert_eq!(output_dir, PathBuf::from("out"));
                assert_eq!(concurrency, 8);
                assert!(overwrite);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_details() {
        let cli = Cli::try_parse_from(["gf", "details", "SWOT_L3_LR_SSH_BASIC"]).unwrap();
        match cli.command {
            Command::Details { product } => assert_eq!(product, "SWOT_L3_LR_SSH_BASIC"),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["gf", "details"]).is_err());
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["gf", "products", "--log-level", "debug", "--timeout", "5"])
            .unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.timeout, 5);
        assert!(Cli::try_parse_from(["gf", "products", "--timeout", "0"]).is_err());
    }
}
