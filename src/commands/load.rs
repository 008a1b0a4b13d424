//! Build a `SkyIndex` from the data files named on the command line

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use skyindex_core::config::EngineConfig;
use skyindex_core::records::{ImportReport, Row};
use skyindex_core::{Result, SkyError, SkyIndex};
use tracing::debug;

use crate::cli::Cli;

/// Engine configuration from `--config`, or the defaults
pub fn load_config(cli: &Cli) -> Result<EngineConfig> {
    match &cli.config {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Read a JSON array of flat objects into rows.
///
/// Numbers and booleans are stringified; nulls are dropped.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let content = fs::read_to_string(path)?;
    let objects: Vec<Map<String, Value>> = serde_json::from_str(&content)?;
    objects
        .into_iter()
        .map(|object| {
            object
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::Null => None,
                    Value::String(s) => Some(Ok((key, s))),
                    Value::Number(n) => Some(Ok((key, n.to_string()))),
                    Value::Bool(b) => Some(Ok((key, b.to_string()))),
                    other => Some(Err(SkyError::invalid_value(&key, other))),
                })
                .collect::<Result<Row>>()
        })
        .collect()
}

fn import(
    path: Option<&Path>,
    what: &str,
    quiet: bool,
    run: impl FnOnce(&[Row]) -> ImportReport,
) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let rows = read_rows(path)?;
    let report = run(&rows);
    debug!(what, processed = report.processed, skipped = report.skipped, "import");
    if report.skipped > 0 && !quiet {
        eprintln!(
            "warning: skipped {} of {} {} rows in {}",
            report.skipped,
            rows.len(),
            what,
            path.display()
        );
    }
    Ok(())
}

/// Config plus every catalog, rating and feature row file
pub fn open_index(cli: &Cli) -> Result<SkyIndex> {
    let index = SkyIndex::new(load_config(cli)?);
    import(cli.catalog.as_deref(), "catalog", cli.quiet, |rows| {
        index.import_entries(rows)
    })?;
    import(cli.ratings.as_deref(), "rating", cli.quiet, |rows| {
        index.import_ratings(rows)
    })?;
    import(cli.features.as_deref(), "feature", cli.quiet, |rows| {
        index.import_features(rows)
    })?;
    Ok(index)
}

/// An index whose model is loaded from `--model`, or trained in place
pub fn open_trained_index(cli: &Cli) -> Result<SkyIndex> {
    let index = open_index(cli)?;
    match &cli.model {
        Some(path) => index.load_model(path)?,
        None => index.train(),
    }
    Ok(index)
}
