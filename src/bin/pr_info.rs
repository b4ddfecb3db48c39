use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pr_review::config::Config;
use pr_review::gh::GhCli;
use pr_review::pr;

/// pr-info — print a structured JSON snapshot of a GitHub Pull Request:
/// metadata, changed files, and existing reviews.
#[derive(Parser, Debug)]
#[command(name = "pr-info", version, about)]
struct Cli {
    /// PR number or full pull request URL
    /// (e.g., 123 or https://github.com/org/repo/pull/123)
    pr: String,

    /// Repository in owner/repo form. Required when the PR is referenced by
    /// bare number and no default repository is configured.
    #[arg(long)]
    repo: Option<String>,
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
    info!(%pr_ref, "fetching pull request info");

    let gh = GhCli::new(config.gh_path());
    let pr_info = pr::fetch_pr_info(&gh, &pr_ref).await?;

    println!("{}", serde_json::to_string_pretty(&pr_info)?);
    Ok(())
}
