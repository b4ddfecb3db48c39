pub mod types;

pub use types::{PayloadComment, ReviewComment, ReviewSubmission};

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::PolicyConfig;
use crate::gh::{GhError, GhRunner};
use crate::pr::PrRef;

/// The only review event this tool ever sends. Approval and change-requests
/// stay with the human reviewer.
pub const EVENT_COMMENT: &str = "COMMENT";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("invalid comments file: {0}")]
    InvalidCommentFile(String),

    #[error("review event `{0}` is not allowed; this tool only submits COMMENT reviews")]
    EventNotAllowed(String),

    #[error("comment on {path}:{line} has category `{category}`, which the review policy excludes")]
    CategoryExcluded {
        path: String,
        line: u64,
        category: String,
    },

    #[error("a comment references a line outside the diff: {0}")]
    LineNotInDiff(String),

    #[error(transparent)]
    Gh(#[from] GhError),

    #[error("unexpected JSON from gh: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Validate the requested review event. Anything but COMMENT is refused
/// before any network traffic happens.
pub fn validate_event(event: &str) -> Result<(), ReviewError> {
    if event.eq_ignore_ascii_case(EVENT_COMMENT) {
        Ok(())
    } else {
        Err(ReviewError::EventNotAllowed(event.to_string()))
    }
}

/// Read and validate a comments file: a JSON array of ReviewComment with at
/// least one entry. The whole file is read into memory before submission.
pub fn load_comments_file(path: &Path) -> Result<Vec<ReviewComment>, ReviewError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ReviewError::InvalidCommentFile(format!("cannot read {}: {e}", path.display()))
    })?;
    let comments: Vec<ReviewComment> = serde_json::from_str(&contents).map_err(|e| {
        ReviewError::InvalidCommentFile(format!(
            "{} is not a JSON array of comments: {e}",
            path.display()
        ))
    })?;
    validate_comments(&comments)?;
    Ok(comments)
}

/// Reject empty lists, empty paths or bodies, 0 line numbers, and range
/// starts that are not strictly before `line`.
pub fn validate_comments(comments: &[ReviewComment]) -> Result<(), ReviewError> {
    if comments.is_empty() {
        return Err(ReviewError::InvalidCommentFile(
            "comments list is empty".to_string(),
        ));
    }
    for (i, comment) in comments.iter().enumerate() {
        if comment.path.trim().is_empty() {
            return Err(ReviewError::InvalidCommentFile(format!(
                "comment {i}: empty path"
            )));
        }
        if comment.line == 0 {
            return Err(ReviewError::InvalidCommentFile(format!(
                "comment {i} ({}): line numbers are 1-based",
                comment.path
            )));
        }
        if comment.body.trim().is_empty() {
            return Err(ReviewError::InvalidCommentFile(format!(
                "comment {i} ({}:{}): empty body",
                comment.path, comment.line
            )));
        }
        if let Some(start) = comment.start_line {
            if start == 0 || start >= comment.line {
                return Err(ReviewError::InvalidCommentFile(format!(
                    "comment {i} ({}:{}): start_line {start} must be a 1-based line before {}",
                    comment.path, comment.line, comment.line
                )));
            }
        }
    }
    Ok(())
}

/// Check every categorized comment against the configured policy. The whole
/// submission is rejected on the first excluded category; nothing is
/// silently filtered out. Uncategorized comments always pass.
pub fn enforce_policy(
    comments: &[ReviewComment],
    policy: &PolicyConfig,
) -> Result<(), ReviewError> {
    for comment in comments {
        if let Some(category) = &comment.category {
            if !policy.allows(category) {
                return Err(ReviewError::CategoryExcluded {
                    path: comment.path.clone(),
                    line: comment.line,
                    category: category.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Assemble the single-shot submission payload.
pub fn build_submission(
    commit_id: String,
    comments: &[ReviewComment],
    body: Option<String>,
) -> ReviewSubmission {
    let comments = comments
        .iter()
        .map(|c| PayloadComment {
            path: c.path.clone(),
            line: c.line,
            body: c.body.clone(),
            side: "RIGHT",
            start_line: c.start_line,
            start_side: c.start_line.map(|_| "RIGHT"),
        })
        .collect();

    ReviewSubmission {
        commit_id,
        event: EVENT_COMMENT,
        comments,
        body,
    }
}

/// Head commit of the PR, used as the review anchor when the caller does not
/// pin one with --commit-sha.
#[instrument(skip(gh), fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number))]
pub async fn fetch_head_sha(gh: &dyn GhRunner, pr: &PrRef) -> Result<String, ReviewError> {
    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct HeadRef {
        head_ref_oid: String,
    }

    let number = pr.number.to_string();
    let slug = pr.repo_slug();

    debug!("fetching head commit via gh pr view");
    let stdout = gh
        .run(
            &[
                "pr",
                "view",
                &number,
                "--repo",
                &slug,
                "--json",
                "headRefOid",
            ],
            None,
        )
        .await?;

    let head: HeadRef = serde_json::from_str(&stdout)?;
    Ok(head.head_ref_oid)
}

/// POST the review. Exactly one write call: either the platform attaches
/// every comment to one review, or the whole call fails. There is no
/// per-comment fallback and no retraction afterwards.
#[instrument(
    skip(gh, submission),
    fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number, comments = submission.comments.len())
)]
pub async fn submit_review(
    gh: &dyn GhRunner,
    pr: &PrRef,
    submission: &ReviewSubmission,
) -> Result<serde_json::Value, ReviewError> {
    let endpoint = format!(
        "repos/{}/{}/pulls/{}/reviews",
        pr.owner, pr.repo, pr.number
    );
    let payload = serde_json::to_string(submission)?;

    debug!(endpoint = %endpoint, bytes = payload.len(), "posting review");
    let stdout = gh
        .run(
            &[
                "api",
                "--method",
                "POST",
                "-H",
                "Accept: application/vnd.github+json",
                "-H",
                "X-GitHub-Api-Version: 2022-11-28",
                &endpoint,
                "--input",
                "-",
            ],
            Some(&payload),
        )
        .await
        .map_err(classify_submit_failure)?;

    let response = if stdout.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(&stdout)?
    };
    info!(comments = submission.comments.len(), "review submitted");
    Ok(response)
}

/// The platform signals an out-of-diff anchor as a 422 naming the line;
/// everything else keeps its transport classification.
fn classify_submit_failure(err: GhError) -> ReviewError {
    if let GhError::CommandFailed { stderr, .. } = &err {
        let lower = stderr.to_lowercase();
        if lower.contains("line must be part of the diff")
            || lower.contains("position is invalid")
        {
            return ReviewError::LineNotInDiff(stderr.trim().to_string());
        }
    }
    ReviewError::Gh(err)
}
