pub mod diff;
pub mod types;

pub use types::{ChangedFile, PrInfo, PrRef};

use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::gh::{GhError, GhRunner};

/// JSON fields requested from `gh pr view`; matches the PrInfo document.
const INFO_FIELDS: &str = "number,title,body,state,author,headRefName,headRefOid,baseRefName,url,additions,deletions,files,reviews";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("malformed PR reference: {0}")]
    MalformedReference(String),

    #[error("file `{0}` has no changes in this diff")]
    FileNotInDiff(String),

    #[error(transparent)]
    Gh(#[from] GhError),

    #[error("unexpected JSON from `gh pr view`: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Normalize a PR reference into (owner, repo, number) before any network
/// call. Accepts a full pull request URL, or a bare number resolved against
/// `repo_context` (an `owner/repo` slug from the --repo flag, config, or the
/// GH_REPO env var). A bare number with no context fails fast.
pub fn resolve_ref(input: &str, repo_context: Option<&str>) -> Result<PrRef, PrError> {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return parse_pr_url(trimmed);
    }

    let number = trimmed.parse::<u64>().map_err(|_| {
        PrError::MalformedReference(format!(
            "`{trimmed}` is neither a PR number nor a pull request URL"
        ))
    })?;

    let slug = repo_context.ok_or_else(|| {
        PrError::MalformedReference(format!(
            "bare PR number {number} requires repository context \
             (--repo, github.default_repo in .pr-review.toml, or GH_REPO)"
        ))
    })?;
    let (owner, repo) = split_repo_slug(slug)?;

    Ok(PrRef {
        owner,
        repo,
        number,
    })
}

/// Parse https://github.com/{owner}/{repo}/pull/{number}.
fn parse_pr_url(input: &str) -> Result<PrRef, PrError> {
    let malformed = || {
        PrError::MalformedReference(format!("`{input}` is not a GitHub pull request URL"))
    };

    let parsed = Url::parse(input).map_err(|_| malformed())?;
    if parsed.host_str() != Some("github.com") {
        return Err(malformed());
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(malformed)?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(malformed());
    }

    let number = segments[3].parse::<u64>().map_err(|_| malformed())?;

    Ok(PrRef {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        number,
    })
}

fn split_repo_slug(slug: &str) -> Result<(String, String), PrError> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(PrError::MalformedReference(format!(
            "`{slug}` is not an owner/repo slug"
        ))),
    }
}

/// Fetch the PR info document via `gh pr view --json`.
#[instrument(skip(gh), fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number))]
pub async fn fetch_pr_info(gh: &dyn GhRunner, pr: &PrRef) -> Result<PrInfo, PrError> {
    let number = pr.number.to_string();
    let slug = pr.repo_slug();

    debug!("fetching PR metadata via gh pr view");
    let stdout = gh
        .run(
            &[
                "pr",
                "view",
                &number,
                "--repo",
                &slug,
                "--json",
                INFO_FIELDS,
            ],
            None,
        )
        .await?;

    let info: PrInfo = serde_json::from_str(&stdout)?;
    debug!(title = %info.title, files = info.files.len(), reviews = info.reviews.len(), "received PR metadata");
    Ok(info)
}

/// Fetch the PR's unified diff via `gh pr diff`, optionally narrowed to the
/// sections touching one file. The diff text is otherwise opaque.
#[instrument(skip(gh), fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number))]
pub async fn fetch_pr_diff(
    gh: &dyn GhRunner,
    pr: &PrRef,
    file: Option<&str>,
) -> Result<String, PrError> {
    let number = pr.number.to_string();
    let slug = pr.repo_slug();

    debug!("fetching PR diff via gh pr diff");
    let full = gh
        .run(&["pr", "diff", &number, "--repo", &slug], None)
        .await?;
    debug!(diff_bytes = full.len(), "received diff");

    match file {
        None => Ok(full),
        Some(path) => diff::filter_by_path(&full, path)
            .ok_or_else(|| PrError::FileNotInDiff(path.to_string())),
    }
}
