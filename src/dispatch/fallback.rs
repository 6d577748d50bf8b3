//! Prerendered-fallback resolution
//!
//! When no exact static file matches, the build output may still hold a
//! prerendered HTML page for the route (`/blog/post-1` emitted as
//! `blog/post-1/index.html`). This module enumerates every `.html` file
//! under the static root and matches routes by path suffix.
//!
//! The enumeration happens per lookup (the set is small and only reached
//! on misses) and is sorted lexicographically, so "first match wins" is
//! deterministic instead of depending on filesystem traversal order.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Find the prerendered page answering a base-stripped request path.
pub async fn find_prerendered(root: &Path, rel_path: &str) -> Option<PathBuf> {
    let pages = collect_html_files(root).await;

    // Anchor the comparison through the absolute static-root path, so the
    // root index.html candidate (whose route collapses to the root itself)
    // only answers "/" and never an arbitrary suffix.
    let resolved = root.join(rel_path.trim_start_matches('/'));
    let resolved = resolved.to_string_lossy().into_owned();
    let wanted = resolved.trim_end_matches('/');

    for page in pages {
        let matched = {
            let candidate = page.to_string_lossy();
            wanted.ends_with(route_of(&candidate))
        };
        if matched {
            return Some(page);
        }
    }
    None
}

/// The route a prerendered file answers: its path with a trailing
/// `/index.html` (directory-style page) or `.html` suffix stripped.
fn route_of(candidate: &str) -> &str {
    candidate
        .strip_suffix("/index.html")
        .or_else(|| candidate.strip_suffix(".html"))
        .unwrap_or(candidate)
}

/// Recursively enumerate `.html` files under a directory, sorted.
/// Unreadable directories are skipped rather than failing the lookup.
async fn collect_html_files(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(mut entries) = fs::read_dir(&dir).await else {
            continue;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            match entry.file_type().await {
                Ok(t) if t.is_dir() => pending.push(path),
                Ok(t) if t.is_file() => {
                    let is_html = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(".html"));
                    if is_html {
                        found.push(path);
                    }
                }
                _ => {}
            }
        }
    }

    found.sort();
    found
}
