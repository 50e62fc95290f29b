//! Main execution logic for the gf CLI.

use anyhow::{Context, Result};
use gf_cli_common::{format_bytes, format_duration};
use gf_convention::{ConventionRegistry, GranuleTable};
use gf_discoverer::{GranuleDiscoverer, LayoutConfig, Product, ThreddsConfig};
use gf_downloader::{
    BulkDownloader, CredentialStore, DownloadConfig, DownloadReport, HttpFetcher, RetryConfig,
    StdinPrompt, DEFAULT_HOST,
};
use gf_types::{Filters, Reference, Value};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::args::{Cli, Command, IntList, Selection};
use crate::output;

/// Exit code of a `get` run where some downloads failed.
pub const PARTIAL_FAILURE_EXIT_CODE: i32 = 4;

/// Execute a command, returning the process exit code.
pub async fn execute(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Products => {
            output::write_products(&config, &mut std::io::stdout().lock())?;
            Ok(0)
        }
        Command::Details { product } => {
            let registry = ConventionRegistry::builtin()?;
            output::write_details(&config, &registry, &product, &mut std::io::stdout().lock())?;
            Ok(0)
        }
        Command::Conventions { name } => {
            let registry = ConventionRegistry::builtin()?;
            if let Some(name) = &name {
                registry.convention(name)?;
            }
            output::write_conventions(&registry, name.as_deref(), &mut std::io::stdout().lock())?;
            Ok(0)
        }
        Command::List {
            selection,
            output_format,
        } => {
            let table = discover(config, cli.timeout, &selection).await?;
            output::write_table(&table, output_format, &mut std::io::stdout().lock())?;
            Ok(0)
        }
        Command::Get {
            selection,
            output_dir,
            overwrite,
            concurrency,
            retries,
            download_timeout,
            netrc,
        } => {
            let table = discover(config, cli.timeout, &selection).await?;
            if table.is_empty() {
                eprintln!("No granule matches the filters");
                return Ok(0);
            }
            let urls = table.into_paths();

            let store = match netrc {
                Some(path) => CredentialStore::new(path),
                None => CredentialStore::user_default()?,
            };
            let credentials =
                tokio::task::spawn_blocking(move || store.ensure(DEFAULT_HOST, &StdinPrompt))
                    .await
                    .context("Credential prompt panicked")??;

            let fetcher = HttpFetcher::new(Duration::from_secs(download_timeout))?
                .with_credentials(credentials);
            let download_config = DownloadConfig::new()
                .with_concurrency(concurrency)
                .with_overwrite(overwrite)
                .with_retry(RetryConfig::new().with_max_retries(retries));

            info!(granules = urls.len(), output_dir = %output_dir.display(), "Downloading");
            let report = BulkDownloader::new(fetcher, download_config)
                .download_all(&urls, &output_dir)
                .await?;

            print_report(&report, &output_dir);
            Ok(if report.is_success() {
                0
            } else {
                PARTIAL_FAILURE_EXIT_CODE
            })
        }
    }
}

/// Layout configuration from `--config`, or the embedded one.
fn load_config(cli: &Cli) -> Result<LayoutConfig> {
    let config = match &cli.config {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("Cannot load layout configuration {}", path.display()))?,
        None => LayoutConfig::embedded()?,
    };
    Ok(match &cli.catalog_url {
        Some(url) => config.with_catalog_base_url(url),
        None => config,
    })
}

/// Filters of a selection: `-f` filters, then the dedicated options.
pub fn build_filters(selection: &Selection) -> Result<Filters> {
    let mut filters = Filters::new();
    for filter in &selection.filters {
        filters.parse_and_add(filter)?;
    }

    let ints = |list: &IntList| match list.0.as_slice() {
        [single] => Reference::Value(Value::Int(*single)),
        values => Reference::List(values.iter().copied().map(Value::Int).collect()),
    };
    if let Some(cycle) = &selection.cycle {
        filters.insert("cycle_number", ints(cycle));
    }
    if let Some(pass) = &selection.pass {
        filters.insert("pass_number", ints(pass));
    }

    if selection.start.is_some() || selection.end.is_some() {
        let bound = |s: &Option<String>| s.as_ref().map(|s| Value::Str(s.clone()));
        filters.insert(
            "time",
            Reference::Bounds(bound(&selection.start), bound(&selection.end)),
        );
    }

    Ok(filters)
}

/// Run the blocking catalog walk off the async runtime.
async fn discover(config: LayoutConfig, timeout: u64, selection: &Selection) -> Result<GranuleTable> {
    let product: Product = config.product(&selection.product)?;
    let filters = build_filters(selection)?;

    let table = tokio::task::spawn_blocking(move || {
        let thredds = ThreddsConfig::new().with_timeout_secs(timeout);
        GranuleDiscoverer::thredds(config, &thredds)?.list_granules(&product, &filters)
    })
    .await
    .context("Discovery task panicked")??;

    info!(granules = table.len(), "Discovery complete");
    Ok(table)
}

fn print_report(report: &DownloadReport, output_dir: &Path) {
    eprintln!();
    eprintln!("Download completed into {}:", output_dir.display());
    eprintln!("  Downloaded: {}", report.downloaded.len());
    eprintln!("  Skipped:    {}", report.skipped.len());
    eprintln!("  Failed:     {}", report.failures.len());
    eprintln!("  Bytes:      {}", format_bytes(report.bytes));
    eprintln!("  Duration:   {}", format_duration(report.elapsed));
    for failure in &report.failures {
        eprintln!("  Error: {} ({})", failure.url, failure.error);
    }
}
