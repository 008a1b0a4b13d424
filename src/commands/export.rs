//! Export loaded entries or ratings as a JSON row file

use std::fs;
use std::path::Path;

use skyindex_core::Result;

use crate::cli::{Cli, ExportTarget};
use crate::commands::load::open_index;

pub fn execute(
    cli: &Cli,
    target: ExportTarget,
    fields: Option<&[String]>,
    output: Option<&Path>,
) -> Result<()> {
    let index = open_index(cli)?;
    let rows = match target {
        ExportTarget::Entries => {
            let fields: Vec<&str> = fields
                .unwrap_or_default()
                .iter()
                .map(String::as_str)
                .collect();
            index.export_entries(&fields)
        }
        ExportTarget::Ratings => {
            if fields.is_some() {
                skyindex_core::bail_usage!("--fields only applies to entry exports");
            }
            index.export_ratings()
        }
    };

    // sorted columns
    let rows: Vec<std::collections::BTreeMap<_, _>> =
        rows.into_iter().map(|row| row.into_iter().collect()).collect();
    let json = serde_json::to_string_pretty(&rows)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            if !cli.quiet {
                eprintln!("Exported {} rows to {}", rows.len(), path.display());
            }
        }
        None => println!("{}", json),
    }
    Ok(())
}
