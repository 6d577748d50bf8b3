//! Exact static-file lookup
//!
//! Serves files under the static-asset root byte-for-byte, with ETag,
//! byte-range and HEAD semantics. "Not found" is a control-flow signal to
//! the dispatcher's next stage; every other I/O failure becomes the
//! matching HTTP error status and ends the dispatch.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::http::{self, cache, mime, range::RangeOutcome};
use crate::logger;

/// Conditional-request data extracted from the incoming headers.
pub struct FileContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range: Option<String>,
}

impl FileContext {
    /// Extract the file-serving context from request parts.
    #[must_use]
    pub fn from_parts(parts: &hyper::http::request::Parts) -> Self {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            is_head: parts.method == hyper::Method::HEAD,
            if_none_match: header("if-none-match"),
            range: header("range"),
        }
    }
}

/// Result of a static lookup.
pub enum ServeOutcome {
    /// File found; response ready (200/206/304/416).
    Served(Response<Full<Bytes>>),
    /// I/O failure other than "not found"; response carries the error
    /// status. Terminal for the dispatch.
    Failed(Response<Full<Bytes>>),
    /// No such file. The dispatcher advances to its next stage.
    NotFound,
}

/// Resolve a base-stripped request path against the static root and serve
/// the exact file. Directories and traversal escapes count as not found.
pub async fn resolve_and_serve(root: &Path, rel_path: &str, ctx: &FileContext) -> ServeOutcome {
    match resolve(root, rel_path) {
        Some(path) => serve_path(&path, ctx).await,
        None => ServeOutcome::NotFound,
    }
}

/// Serve a known file path with conditional-request semantics.
pub async fn serve_path(path: &Path, ctx: &FileContext) -> ServeOutcome {
    let metadata = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) => return io_error_outcome(&e, path),
    };
    // A directory is not an exact static file; index resolution is the
    // prerendered-fallback stage's job.
    if metadata.is_dir() {
        return ServeOutcome::NotFound;
    }

    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => return io_error_outcome(&e, path),
    };
    let content_type = mime::content_type_for(path.extension().and_then(|e| e.to_str()));
    ServeOutcome::Served(build_file_response(&content, content_type, ctx))
}

/// Map a request path onto the static root, refusing escapes. A `..`
/// component is an outright miss; `..` inside a file name is fine.
fn resolve(root: &Path, rel_path: &str) -> Option<PathBuf> {
    let rel = rel_path.trim_start_matches('/');
    if rel.split('/').any(|segment| segment == "..") {
        return None;
    }
    let candidate = root.join(rel);

    let root_canonical = match root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static root {} not accessible: {e}",
                root.display()
            ));
            return None;
        }
    };
    // Canonicalize fails for missing files; that is an ordinary miss.
    let candidate_canonical = candidate.canonicalize().ok()?;
    if !candidate_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {rel_path} -> {}",
            candidate_canonical.display()
        ));
        return None;
    }
    Some(candidate_canonical)
}

/// Translate an I/O failure into a dispatch outcome. NotFound advances the
/// fallback chain; anything else is surfaced as its HTTP status.
fn io_error_outcome(error: &std::io::Error, path: &Path) -> ServeOutcome {
    match error.kind() {
        ErrorKind::NotFound => ServeOutcome::NotFound,
        ErrorKind::PermissionDenied => {
            logger::log_warning(&format!("Permission denied reading {}", path.display()));
            ServeOutcome::Failed(http::build_status_response(
                StatusCode::FORBIDDEN,
                "403 Forbidden",
            ))
        }
        _ => {
            logger::log_error(&format!("Failed to read {}: {error}", path.display()));
            ServeOutcome::Failed(http::build_status_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error",
            ))
        }
    }
}

/// Build the response for file contents: 304 on a matched validator,
/// 206/416 for ranges, otherwise a full 200.
fn build_file_response(
    data: &[u8],
    content_type: &str,
    ctx: &FileContext,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(data);
    let total_size = data.len();

    if cache::etag_matches(ctx.if_none_match.as_deref(), &etag) {
        return http::build_not_modified_response(&etag);
    }

    match http::parse_range_header(ctx.range.as_deref(), total_size) {
        RangeOutcome::Valid(range) => {
            let start = range.start;
            let end = range.end_position(total_size);
            let body = if ctx.is_head {
                Bytes::new()
            } else {
                Bytes::from(data[start..=end].to_vec())
            };
            return http::build_partial_response(
                body,
                content_type,
                &etag,
                start,
                end,
                total_size,
                ctx.is_head,
            );
        }
        RangeOutcome::NotSatisfiable => {
            return http::build_range_not_satisfiable_response(total_size);
        }
        RangeOutcome::None => {}
    }

    let body = if ctx.is_head {
        Bytes::new()
    } else {
        Bytes::from(data.to_owned())
    };
    http::build_cached_response(body, content_type, &etag, ctx.is_head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_ctx() -> FileContext {
        FileContext {
            is_head: false,
            if_none_match: None,
            range: None,
        }
    }

    #[tokio::test]
    async fn serves_exact_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("app.css"), b"body{}").unwrap();

        match resolve_and_serve(root.path(), "/app.css", &plain_ctx()).await {
            ServeOutcome::Served(resp) => {
                assert_eq!(resp.status(), StatusCode::OK);
                assert_eq!(resp.headers()["Content-Type"], "text/css");
            }
            _ => panic!("expected Served"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            resolve_and_serve(root.path(), "/nope.css", &plain_ctx()).await,
            ServeOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("blog")).unwrap();
        assert!(matches!(
            resolve_and_serve(root.path(), "/blog", &plain_ctx()).await,
            ServeOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn traversal_is_blocked() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("public");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(parent.path().join("secret.txt"), b"keep out").unwrap();

        // A sibling file exists, but ".." must never reach it.
        assert!(matches!(
            resolve_and_serve(&root, "/../secret.txt", &plain_ctx()).await,
            ServeOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn dots_inside_file_names_are_served() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("app..js"), b"boot();").unwrap();

        match resolve_and_serve(root.path(), "/app..js", &plain_ctx()).await {
            ServeOutcome::Served(resp) => assert_eq!(resp.status(), StatusCode::OK),
            _ => panic!("expected Served"),
        }
    }

    #[tokio::test]
    async fn matched_etag_returns_304() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("index.html"), b"<html></html>").unwrap();
        let etag = cache::generate_etag(b"<html></html>");

        let ctx = FileContext {
            is_head: false,
            if_none_match: Some(etag),
            range: None,
        };
        match resolve_and_serve(root.path(), "/index.html", &ctx).await {
            ServeOutcome::Served(resp) => assert_eq!(resp.status(), StatusCode::NOT_MODIFIED),
            _ => panic!("expected Served"),
        }
    }

    #[tokio::test]
    async fn range_request_returns_partial_content() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("data.txt"), b"0123456789").unwrap();

        let ctx = FileContext {
            is_head: false,
            if_none_match: None,
            range: Some("bytes=2-5".to_string()),
        };
        match resolve_and_serve(root.path(), "/data.txt", &ctx).await {
            ServeOutcome::Served(resp) => {
                assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
                assert_eq!(resp.headers()["Content-Range"], "bytes 2-5/10");
            }
            _ => panic!("expected Served"),
        }
    }

    #[tokio::test]
    async fn unsatisfiable_range_returns_416() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("data.txt"), b"0123456789").unwrap();

        let ctx = FileContext {
            is_head: false,
            if_none_match: None,
            range: Some("bytes=99-".to_string()),
        };
        match resolve_and_serve(root.path(), "/data.txt", &ctx).await {
            ServeOutcome::Served(resp) => {
                assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
            }
            _ => panic!("expected Served"),
        }
    }
}
