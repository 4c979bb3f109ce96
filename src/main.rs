use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use verse_lexicon::cli::{AnalyzeArgs, Command, GlobalArgs, NormalizeArgs, ResolveArgs, RootArgs};
use verse_lexicon::normalize::{normalize, NormalizationOutcome};
use verse_lexicon::{AnalyzeError, Analyzer, BoundaryOutcome, Config, Mode, ReferenceResolver};

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.global.verbose);

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: RootArgs) -> Result<ExitCode> {
    let config = load_config(&args.global)?;
    match args.command {
        Command::Resolve(args) => cmd_resolve(&config, args),
        Command::Analyze(args) => cmd_analyze(&config, args),
        Command::Normalize(args) => cmd_normalize(args),
        Command::Refs => cmd_refs(&config),
        Command::Status => cmd_status(&config),
    }
}

fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config
        .apply_env(|name| std::env::var(name).ok())
        .context("apply environment overrides")?;
    Ok(config)
}

fn mode(lenient: bool) -> Mode {
    if lenient {
        Mode::Lenient
    } else {
        Mode::Strict
    }
}

fn cmd_resolve(config: &Config, args: ResolveArgs) -> Result<ExitCode> {
    let analyzer = Analyzer::from_config(config, Mode::Strict);
    match analyzer.resolve(&args.reference) {
        Ok(source) => print_json(&source),
        Err(err) => report(&err),
    }
}

fn cmd_analyze(config: &Config, args: AnalyzeArgs) -> Result<ExitCode> {
    let analyzer = Analyzer::from_config(config, mode(args.lenient));
    match analyzer.analyze(&args.reference) {
        Ok(analysis) => print_json(&analysis),
        Err(err) => report(&err),
    }
}

fn cmd_normalize(args: NormalizeArgs) -> Result<ExitCode> {
    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read model reply {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read model reply from stdin")?;
            buf
        }
    };
    match normalize(&raw, mode(args.lenient)) {
        NormalizationOutcome::Valid(elements) => print_json(&elements),
        NormalizationOutcome::Malformed(malformed) => report(&AnalyzeError::Malformed(malformed)),
    }
}

fn cmd_refs(config: &Config) -> Result<ExitCode> {
    let resolver = ReferenceResolver::from_config(config);
    for reference in resolver.available_references() {
        println!("{reference}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_status(config: &Config) -> Result<ExitCode> {
    let resolver = ReferenceResolver::from_config(config);
    let route = config.model_route();
    print_json(&json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "providers": resolver.provider_ids(),
        "model": route,
        "model_key_configured": config.model_api_key.is_some(),
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::SUCCESS)
}

/// Render a boundary failure as JSON on stdout and pick the exit code.
fn report(err: &AnalyzeError) -> Result<ExitCode> {
    let mut body = json!({
        "error": err.kind(),
        "status": err.status_code(),
        "detail": err.to_string(),
    });
    if let AnalyzeError::NotFound { tried, available, .. } = err {
        body["tried"] = json!(tried);
        body["available"] = json!(available);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(match err.outcome() {
        BoundaryOutcome::NotResolvable => ExitCode::from(2),
        BoundaryOutcome::Success | BoundaryOutcome::ServerError => ExitCode::from(1),
    })
}
