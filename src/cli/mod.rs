//! CLI argument parsing for skyindex
//!
//! Global flags select the data files loaded before every command:
//! --config, --catalog, --ratings, --features, --model, --format

pub mod export;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use export::ExportTarget;
pub use output::OutputFormat;

/// Skyindex - search and recommend astronomical objects
#[derive(Parser, Debug)]
#[command(name = "skyindex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true, env = "SKYINDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalog entries file (JSON array of rows)
    #[arg(long, global = true, env = "SKYINDEX_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Ratings file (JSON array of rows)
    #[arg(long, global = true)]
    pub ratings: Option<PathBuf>,

    /// Item features file (JSON array of rows)
    #[arg(long, global = true)]
    pub features: Option<PathBuf>,

    /// Trained model file; loaded instead of training when present
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level filter (e.g. "debug", "skyindex_core=trace")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up entries by exact name or alias
    Search {
        /// Name or alias
        query: String,

        /// Order results by popularity
        #[arg(long)]
        ranked: bool,
    },

    /// Find entries whose name or alias is within an edit distance
    Fuzzy {
        /// Approximate name
        query: String,

        /// Maximum edit distance (defaults to the configured distance)
        #[arg(long, short)]
        distance: Option<usize>,
    },

    /// Complete a name or alias prefix
    Complete {
        /// Prefix to complete
        prefix: String,
    },

    /// List entries matching record attributes
    Filter {
        /// Object type (exact match)
        #[arg(long, short = 'T')]
        r#type: Option<String>,

        /// Morphology (exact match)
        #[arg(long, short)]
        morphology: Option<String>,

        /// Lower bound on visual magnitude
        #[arg(long)]
        min_mag: Option<f64>,

        /// Upper bound on visual magnitude
        #[arg(long)]
        max_mag: Option<f64>,
    },

    /// Objects with similar type, position and brightness
    Similar {
        /// Entry name
        name: String,

        /// Maximum number of results
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Recommend items for a user
    Recommend {
        /// User identifier
        user: String,

        /// Number of recommendations
        #[arg(long, short = 'n', default_value_t = 10)]
        top: usize,

        /// Blend model scores with content similarity
        #[arg(long, conflicts_with = "content")]
        hybrid: bool,

        /// Use content similarity to highly rated items only
        #[arg(long)]
        content: bool,
    },

    /// Predict a user's rating for an item
    Predict {
        /// User identifier
        user: String,

        /// Item name
        item: String,
    },

    /// Items with the most similar content features
    Related {
        /// Item name
        item: String,

        /// Number of results
        #[arg(long, short = 'n', default_value_t = 10)]
        top: usize,
    },

    /// Train the latent-factor model on the loaded ratings
    Train {
        /// Write the trained model to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Write loaded rows back out as JSON
    Export {
        /// What to export
        #[arg(value_enum)]
        target: ExportTarget,

        /// Comma-separated entry fields (entries only; default all)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show catalog, cache and recommender statistics
    Stats,
}
