use serde::{Deserialize, Serialize};

/// One inline review comment as read from the comments file.
///
/// `line` is 1-based in the new version of the file. When `start_line` is
/// present the comment spans the range `start_line..=line`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub path: String,
    pub line: u64,
    pub body: String,
    #[serde(default)]
    pub start_line: Option<u64>,
    /// Optional policy category (e.g. "security"), checked against the
    /// configured review policy before submission.
    #[serde(default)]
    pub category: Option<String>,
}

/// Inline comment in the shape the review endpoint expects. Comments always
/// anchor to the new side of the diff.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadComment {
    pub path: String,
    pub line: u64,
    pub body: String,
    pub side: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_side: Option<&'static str>,
}

/// The complete review payload: one POST, all comments attached atomically
/// by the platform. Built once, submitted once, never retried.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSubmission {
    pub commit_id: String,
    pub event: &'static str,
    pub comments: Vec<PayloadComment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
