use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pr_review::config::Config;
use pr_review::gh::GhCli;
use pr_review::pr;

/// pr-diff — print the unified diff of a GitHub Pull Request, optionally
/// narrowed to a single file.
#[derive(Parser, Debug)]
#[command(name = "pr-diff", version, about)]
struct Cli {
    /// PR number or full pull request URL
    pr: String,

    /// Repository in owner/repo form. Required when the PR is referenced by
    /// bare number and no default repository is configured.
    #[arg(long)]
    repo: Option<String>,

    /// Only print the diff sections touching this file path
    #[arg(long)]
    file: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let repo_context = cli.repo.clone().or_else(|| config.default_repo());

    debug!(reference = %cli.pr, "resolving PR reference");
    let pr_ref = pr::resolve_ref(&cli.pr, repo_context.as_deref())?;
    info!(%pr_ref, file = cli.file.as_deref().unwrap_or("<all>"), "fetching pull request diff");

    let gh = GhCli::new(config.gh_path());
    let diff = pr::fetch_pr_diff(&gh, &pr_ref, cli.file.as_deref()).await?;

    print!("{diff}");
    Ok(())
}
