use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pr_review::config::Config;
use pr_review::gh::GhCli;
use pr_review::pr;
use pr_review::review;

/// submit-review — post one comment-only review with inline comments on a
/// GitHub Pull Request. All comments are attached in a single submission;
/// the call either fully succeeds or fully fails.
#[derive(Parser, Debug)]
#[command(name = "submit-review", version, about)]
struct Cli {
    /// PR number
    pr_number: u64,

    /// Repository in owner/repo form
    #[arg(long)]
    repo: String,

    /// JSON file with an array of comments:
    /// [{"path", "line", "body", "start_line"?, "category"?}, ...]
    #[arg(long)]
    comments_file: PathBuf,

    /// Review event. Only COMMENT is accepted; this tool never approves or
    /// requests changes.
    #[arg(long, default_value = "COMMENT")]
    event: String,

    /// Optional overall review summary
    #[arg(long)]
    body: Option<String>,

    /// Commit to anchor the review to (defaults to the PR head)
    #[arg(long)]
    commit_sha: Option<String>,
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

    // Local validation happens in full before any network call.
    review::validate_event(&cli.event)?;
    let comments = review::load_comments_file(&cli.comments_file)?;
    review::enforce_policy(&comments, &config.policy)?;
    info!(comments = comments.len(), "comments file validated");

    let pr_ref = pr::resolve_ref(&cli.pr_number.to_string(), Some(cli.repo.as_str()))?;
    let gh = GhCli::new(config.gh_path());

    let commit_id = match cli.commit_sha {
        Some(sha) => sha,
        None => review::fetch_head_sha(&gh, &pr_ref).await?,
    };
    debug!(commit = %commit_id, "anchoring review");

    let submission = review::build_submission(commit_id, &comments, cli.body);
    let response = review::submit_review(&gh, &pr_ref, &submission).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    eprintln!(
        "{} review submitted with {} inline comments",
        "✔".green().bold(),
        comments.len()
    );
    Ok(())
}
