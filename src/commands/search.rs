//! Catalog lookups: exact, fuzzy, prefix, attribute and neighbour search

use skyindex_core::catalog::CatalogEntry;
use skyindex_core::query::AttributeFilter;
use skyindex_core::similarity::SimilarityResult;
use skyindex_core::Result;

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use crate::commands::load::open_index;

/// One line per entry: name, aliases, then type and magnitude when known
pub fn print_entries(cli: &Cli, entries: &[CatalogEntry]) {
    if entries.is_empty() {
        if !cli.quiet {
            eprintln!("No matches");
        }
        return;
    }
    for entry in entries {
        let mut line = entry.name.clone();
        if !entry.aliases.is_empty() {
            line.push_str(&format!(" ({})", entry.aliases.join(", ")));
        }
        if let Some(record) = &entry.record {
            if !record.object_type.is_empty() {
                line.push_str(&format!(" [{}]", record.object_type));
            }
            line.push_str(&format!(" mag {:.1}", record.visual_magnitude));
        }
        println!("{}", line);
    }
}

pub fn print_similar(results: &[SimilarityResult]) {
    for result in results {
        println!("{}\t{:.4}", result.id, result.score);
    }
}

fn output_entries(cli: &Cli, entries: &[CatalogEntry]) -> Result<()> {
    output_by_format_result!(cli.format,
        json => print_json(entries),
        human => { print_entries(cli, entries); }
    )
}

pub fn execute(cli: &Cli, query: &str, ranked: bool) -> Result<()> {
    let index = open_index(cli)?;
    let results = if ranked {
        index.ranked_search(query)
    } else {
        index.search(query)
    };
    output_entries(cli, &results)
}

pub fn execute_fuzzy(cli: &Cli, query: &str, distance: Option<usize>) -> Result<()> {
    let index = open_index(cli)?;
    let results = index.fuzzy_search(query, distance);
    output_entries(cli, &results)
}

pub fn execute_complete(cli: &Cli, prefix: &str) -> Result<()> {
    let index = open_index(cli)?;
    let words = index.autocomplete(prefix);
    output_by_format_result!(cli.format,
        json => print_json(&words),
        human => {
            for word in &words {
                println!("{}", word);
            }
        }
    )
}

pub fn execute_filter(
    cli: &Cli,
    object_type: Option<&str>,
    morphology: Option<&str>,
    min_mag: Option<f64>,
    max_mag: Option<f64>,
) -> Result<()> {
    if let (Some(min), Some(max)) = (min_mag, max_mag) {
        if min > max {
            skyindex_core::bail_usage!(format!(
                "--min-mag {min} is greater than --max-mag {max}"
            ));
        }
    }

    let filter = AttributeFilter::new()
        .with_type(object_type)
        .with_morphology(morphology)
        .with_magnitude_range(min_mag, max_mag);
    let index = open_index(cli)?;
    let results = index.filter(&filter);
    output_entries(cli, &results)
}

pub fn execute_similar(cli: &Cli, name: &str, limit: Option<usize>) -> Result<()> {
    let index = open_index(cli)?;
    let results = index.similar_objects(name, limit)?;
    output_by_format_result!(cli.format,
        json => print_json(&results),
        human => { print_similar(&results); }
    )
}
