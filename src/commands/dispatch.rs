//! Command dispatch logic for skyindex

use std::time::Instant;

use skyindex_core::Result;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::commands;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Self {
        Self { cli, start }
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("skyindex {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Search and recommend astronomical objects from a local catalog.");
        println!();
        println!("Run `skyindex --help` for usage information.");
        Ok(())
    }
}

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let cli = ctx.cli;
        match self {
            Commands::Search { query, ranked } => commands::search::execute(cli, query, *ranked),
            Commands::Fuzzy { query, distance } => {
                commands::search::execute_fuzzy(cli, query, *distance)
            }
            Commands::Complete { prefix } => commands::search::execute_complete(cli, prefix),
            Commands::Filter {
                r#type,
                morphology,
                min_mag,
                max_mag,
            } => commands::search::execute_filter(
                cli,
                r#type.as_deref(),
                morphology.as_deref(),
                *min_mag,
                *max_mag,
            ),
            Commands::Similar { name, limit } => {
                commands::search::execute_similar(cli, name, *limit)
            }
            Commands::Recommend {
                user,
                top,
                hybrid,
                content,
            } => commands::recommend::execute(cli, user, *top, *hybrid, *content),
            Commands::Predict { user, item } => {
                commands::recommend::execute_predict(cli, user, item)
            }
            Commands::Related { item, top } => {
                commands::recommend::execute_related(cli, item, *top)
            }
            Commands::Train { save } => commands::train::execute(cli, save.as_deref()),
            Commands::Export {
                target,
                fields,
                output,
            } => commands::export::execute(cli, *target, fields.as_deref(), output.as_deref()),
            Commands::Stats => commands::stats::execute(cli),
        }
    }
}

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let ctx = CommandContext::new(cli, start);

    let result = match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    };

    debug!(elapsed = ?ctx.start.elapsed(), ok = result.is_ok(), "command finished");
    result
}
