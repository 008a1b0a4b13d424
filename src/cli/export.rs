use clap::ValueEnum;

/// Row sets the export command can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Entries,
    Ratings,
}
