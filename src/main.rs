//! xpocommit - CLI entry point.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xpocommit::config::Settings;
use xpocommit::diff::{AssembledDiff, DiffOutcome, collect_diff};
use xpocommit::git::{GitRepo, RepositoryInspector};
use xpocommit::requester::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use xpocommit::requester::{CREDENTIAL_ENV_VARS, Credential, GeminiClient, generate_commit_message};

/// Collect pending git changes and generate a commit message from them.
#[derive(Parser, Debug)]
#[command(name = "xpocommit")]
#[command(about = "Generate commit messages from pending git changes")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the assembled diff of all pending changes
    Diff(CollectArgs),

    /// Generate a commit message for all pending changes
    Generate {
        #[command(flatten)]
        collect: CollectArgs,

        /// Model to request the message from (overrides settings)
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CollectArgs {
    /// Repository directory (defaults to the current directory)
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Settings file (defaults to .xpocommit.toml at the repository root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra ignore pattern, appended to the configured ones (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the diff or message
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Diff(args) => {
            let (_, outcome) = collect(&args).await?;
            if let Some(diff) = report(outcome) {
                println!("{}", diff.text);
            }
        }
        Command::Generate { collect: args, model } => {
            let (settings, outcome) = collect(&args).await?;
            let Some(diff) = report(outcome) else {
                return Ok(());
            };

            let model = model
                .or(settings.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string());
            let base = settings
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
            let client = GeminiClient::new(base, model);

            let credential = Credential::from_env();
            if credential.is_none() {
                anyhow::bail!(
                    "No API key found. Set {} or {}.",
                    CREDENTIAL_ENV_VARS[0],
                    CREDENTIAL_ENV_VARS[1]
                );
            }

            eprintln!(
                "Generating commit message from {} file(s) with {}...",
                diff.files.len(),
                client.model()
            );
            let message = generate_commit_message(&client, &diff, credential.as_ref())
                .await
                .context("Failed to generate commit message")?;
            println!("{message}");
        }
    }
    Ok(())
}

/// Load settings and collect the filtered diff for `args.repo`.
async fn collect(args: &CollectArgs) -> Result<(Settings, DiffOutcome)> {
    let backend = GitRepo::discover(&args.repo);
    let settings = Settings::load(args.config.as_deref(), backend.root())
        .context("Failed to load settings")?
        .with_extra_patterns(args.ignore.iter().cloned());

    let matcher = settings.matcher();
    let inspector = RepositoryInspector::new(backend, &args.repo);
    let outcome = collect_diff(&inspector, &matcher)
        .await
        .context("Failed to collect pending changes")?;

    Ok((settings, outcome))
}

/// Print the notice for a no-diff outcome; pass a diff through.
fn report(outcome: DiffOutcome) -> Option<AssembledDiff> {
    match outcome {
        DiffOutcome::Diff(diff) => Some(diff),
        DiffOutcome::NoDiff(reason) => {
            eprintln!("{reason}");
            None
        }
    }
}
