//! Per-file filtering of a unified diff.
//!
//! The diff is treated as an opaque blob except for the `diff --git`
//! headers that delimit file sections. Filtering keeps whole sections, so
//! the output is always a line-for-line subset of the input.

/// Extract the section(s) of a unified diff that touch `path`.
///
/// A section matches when either its old or its new path equals `path`
/// exactly, so renames stay addressable from both sides. Returns None when
/// nothing in the diff touches the path.
pub fn filter_by_path(diff: &str, path: &str) -> Option<String> {
    let mut kept = String::new();
    let mut in_match = false;
    let mut matched = false;

    for line in diff.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            in_match = header_names_path(rest, path);
            matched |= in_match;
        }
        if in_match {
            kept.push_str(line);
            kept.push('\n');
        }
    }

    matched.then_some(kept)
}

/// `rest` is the header tail `a/<old> b/<new>`; compare both sides.
fn header_names_path(rest: &str, path: &str) -> bool {
    let mut parts = rest.split_whitespace();
    let old = parts.next().and_then(|p| p.strip_prefix("a/"));
    let new = parts.next().and_then(|p| p.strip_prefix("b/"));
    old == Some(path) || new == Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DIFF: &str = include_str!("../../tests/fixtures/sample_diff.patch");

    #[test]
    fn test_filter_keeps_only_requested_file() {
        let filtered = filter_by_path(SAMPLE_DIFF, "src/worker.rs").unwrap();
        assert!(filtered.starts_with("diff --git a/src/worker.rs b/src/worker.rs"));
        assert!(filtered.contains("@@ -10,5 +10,6 @@"));
        assert!(!filtered.contains("src/config.rs"));
        assert!(!filtered.contains("docs/setup.md"));
    }

    #[test]
    fn test_filtered_output_is_subset_of_input() {
        let filtered = filter_by_path(SAMPLE_DIFF, "src/config.rs").unwrap();
        for line in filtered.lines() {
            assert!(SAMPLE_DIFF.contains(line), "line not in input: {line}");
        }
    }

    #[test]
    fn test_filter_matches_rename_on_either_side() {
        let diff = "\
diff --git a/src/old_name.rs b/src/new_name.rs
similarity index 90%
rename from src/old_name.rs
rename to src/new_name.rs
--- a/src/old_name.rs
+++ b/src/new_name.rs
@@ -1 +1 @@
-old
+new
";
        assert!(filter_by_path(diff, "src/old_name.rs").is_some());
        assert!(filter_by_path(diff, "src/new_name.rs").is_some());
    }

    #[test]
    fn test_filter_requires_exact_path_match() {
        // a suffix or substring of a changed path is not a match
        assert!(filter_by_path(SAMPLE_DIFF, "worker.rs").is_none());
        assert!(filter_by_path(SAMPLE_DIFF, "src/worker").is_none());
    }

    #[test]
    fn test_filter_unknown_path_returns_none() {
        assert!(filter_by_path(SAMPLE_DIFF, "src/not_here.rs").is_none());
    }

    #[test]
    fn test_filter_empty_diff_returns_none() {
        assert!(filter_by_path("", "src/worker.rs").is_none());
    }
}
