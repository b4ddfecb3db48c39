//! Command-line toolkit for GitHub pull-request reviews.
//!
//! Three stateless binaries share this library: `pr-info` prints a JSON
//! snapshot of a pull request, `pr-diff` prints its unified diff, and
//! `submit-review` posts a single comment-only review with inline comments.
//! All network traffic goes through a pre-authenticated `gh` CLI session;
//! this crate never reads or stores credentials itself.

pub mod config;
pub mod gh;
pub mod pr;
pub mod review;
