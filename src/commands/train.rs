//! Train the latent-factor model and optionally persist it

use std::path::Path;

use skyindex_core::Result;
use tracing::info;

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use crate::commands::load::open_index;

pub fn execute(cli: &Cli, save: Option<&Path>) -> Result<()> {
    let index = open_index(cli)?;
    index.train();
    if let Some(path) = save {
        index.save_model(path)?;
        info!(path = %path.display(), "model saved");
    }

    let stats = index.stats().recommender;
    output_by_format_result!(cli.format,
        json => print_json(&serde_json::json!({
            "users": stats.users,
            "items": stats.items,
            "ratings": stats.ratings,
            "latent_factors": stats.latent_factors,
            "global_mean": stats.global_mean,
            "saved": save.map(|p| p.display().to_string()),
        })),
        human => {
            if !cli.quiet {
                println!(
                    "Trained on {} ratings ({} users, {} items, {} factors)",
                    stats.ratings, stats.users, stats.items, stats.latent_factors
                );
                if let Some(path) = save {
                    println!("Saved model to {}", path.display());
                }
            }
        }
    )
}
