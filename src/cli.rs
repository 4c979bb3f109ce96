//! CLI argument parsing for the `vlex` binary.
//!
//! The CLI is intentionally thin: each command builds a `Config` once and
//! hands it to the library, so the same core logic can sit behind any other
//! front end.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "vlex",
    version,
    about = "Resolve scripture references to Greek text and analyze each word",
    after_help = "Examples:\n  vlex resolve \"John 1:1\"\n  vlex analyze \"John 3:16\"\n  vlex analyze \"Romans 8:28\" --lenient\n  vlex normalize --file reply.txt\n  vlex refs\n  vlex status",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// JSON config file; environment variables are applied on top
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit debug logging to stderr (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Resolve(ResolveArgs),
    Analyze(AnalyzeArgs),
    Normalize(NormalizeArgs),
    /// List references served from the built-in table
    Refs,
    /// Show configured providers and model route
    Status,
}

#[derive(Parser, Debug)]
#[command(about = "Resolve a reference to its source text via the provider chain")]
pub struct ResolveArgs {
    /// Reference such as "John 1:1" or "1 Corinthians 13:4-7"
    pub reference: String,
}

#[derive(Parser, Debug)]
#[command(about = "Resolve a reference and run lexical analysis on its text")]
pub struct AnalyzeArgs {
    /// Reference such as "John 1:1" or "1 Corinthians 13:4-7"
    pub reference: String,

    /// Pass through entries that fail schema checks instead of rejecting the reply
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Normalize a raw model reply into validated lexical entries")]
pub struct NormalizeArgs {
    /// File holding the raw reply (reads stdin when omitted)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Pass through entries that fail schema checks instead of rejecting the reply
    #[arg(long)]
    pub lenient: bool,
}
