//! Utility functions for cross-platform path handling

/// Convert a path to git format (always forward slashes)
///
/// Git reports forward slashes everywhere, but paths may also arrive from
/// callers on Windows. Classification only ever compares forward-slash strings.
pub fn to_git_path(path: &str) -> String {
  path.trim().replace('\\', "/")
}

/// Whether `path` equals `entry` or lives under it
///
/// Entries ending in `/` are directory prefixes. Bare entries match exactly or as
/// a whole path component prefix (`scripts` matches `scripts/x` but not `scripts2`).
pub fn path_matches(path: &str, entry: &str) -> bool {
  if let Some(dir) = entry.strip_suffix('/') {
    return path == dir || path.starts_with(entry);
  }
  path == entry || path.strip_prefix(entry).is_some_and(|rest| rest.starts_with('/'))
}

/// First path segment and the remainder (`apps/web/src/x.ts` → `("apps", "web/src/x.ts")`)
pub fn split_first_segment(path: &str) -> (&str, Option<&str>) {
  match path.split_once('/') {
    Some((head, rest)) => (head, Some(rest)),
    None => (path, None),
  }
}
