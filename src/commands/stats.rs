use skyindex_core::Result;

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use crate::commands::load::open_index;

pub fn execute(cli: &Cli) -> Result<()> {
    let index = open_index(cli)?;
    let stats = index.stats();
    output_by_format_result!(cli.format,
        json => print_json(&stats),
        human => {
            let rec = &stats.recommender;
            println!("Entries: {}", stats.entries);
            println!("Aliases: {}", stats.aliases);
            println!("Indexed words: {}", stats.indexed_words);
            println!(
                "Query cache: {}/{} (hit rate {:.1}%)",
                stats.query_cache.size,
                stats.query_cache.capacity,
                stats.query_cache.hit_rate * 100.0
            );
            println!(
                "Users: {}  Items: {} ({} retired)  Features: {}",
                rec.users, rec.items, rec.retired_items, rec.features
            );
            println!("Ratings: {} (mean {:.2})", rec.ratings, rec.global_mean);
            println!(
                "Model: {} ({} factors)",
                if rec.trained { "trained" } else { "untrained" },
                rec.latent_factors
            );
        }
    )
}
