use clap::ValueEnum;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain lines for terminals
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
}
