//! Personalized recommendations, rating predictions and related items

use serde::Serialize;
use skyindex_core::Result;

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use crate::commands::load::open_trained_index;
use crate::commands::search::print_similar;

#[derive(Debug, Serialize)]
struct Scored<'a> {
    item: &'a str,
    score: f64,
}

pub fn execute(cli: &Cli, user: &str, top: usize, hybrid: bool, content: bool) -> Result<()> {
    let index = open_trained_index(cli)?;
    let ranked = if hybrid {
        index.hybrid_recommendations(user, top)?
    } else if content {
        index.content_recommendations(user, top)
    } else {
        index.recommend(user, top)?
    };

    let scored: Vec<Scored> = ranked
        .iter()
        .map(|(item, score)| Scored { item, score: *score })
        .collect();
    output_by_format_result!(cli.format,
        json => print_json(&scored),
        human => {
            if scored.is_empty() && !cli.quiet {
                eprintln!("No recommendations for {}", user);
            }
            for s in &scored {
                println!("{}\t{:.4}", s.item, s.score);
            }
        }
    )
}

pub fn execute_predict(cli: &Cli, user: &str, item: &str) -> Result<()> {
    let index = open_trained_index(cli)?;
    let score = index.predict(user, item)?;
    output_by_format_result!(cli.format,
        json => print_json(&serde_json::json!({
            "user": user,
            "item": item,
            "score": score,
        })),
        human => { println!("{:.4}", score); }
    )
}

pub fn execute_related(cli: &Cli, item: &str, top: usize) -> Result<()> {
    let index = open_trained_index(cli)?;
    let results = index.similar_items(item, top)?;
    output_by_format_result!(cli.format,
        json => print_json(&results),
        human => { print_similar(&results); }
    )
}
