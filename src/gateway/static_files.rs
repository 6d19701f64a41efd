//! Static file serving module
//!
//! Resolves a [`FileRequest`] under the static root and answers from file
//! metadata first: validators, 304, HEAD and 416 never touch the content.
//! Range bodies are read by seeking, full bodies by reading the file.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::route::FileRequest;
use super::ServeError;
use crate::http::{self, cache, mime, ByteRange, RangeOutcome, Validators};
use crate::logger;

/// Request headers that shape a file response
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

/// What is known about a file before reading it
#[derive(Debug)]
pub struct FileMeta {
    pub len: u64,
    pub content_type: &'static str,
    pub modified: Option<SystemTime>,
}

impl FileMeta {
    pub fn validators(&self) -> Validators {
        Validators {
            etag: cache::generate_etag(self.len, self.modified),
            last_modified: self.modified.map(cache::format_http_date),
        }
    }
}

/// Map `{static_dir}/{project}/{path}` to a filesystem path
///
/// `project` must be one plain directory name and `path` may only descend.
pub fn resolve_file(static_dir: &Path, request: &FileRequest) -> Result<PathBuf, ServeError> {
    let mut project = Path::new(&request.project).components();
    let project_dir = match (project.next(), project.next()) {
        (Some(Component::Normal(name)), None) => static_dir.join(name),
        _ => return Err(ServeError::Forbidden),
    };

    let mut resolved = project_dir;
    for component in Path::new(request.path.trim_start_matches(['/', '\\'])).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ServeError::Forbidden);
            }
        }
    }

    Ok(resolved)
}

/// Stat a regular file; anything missing or not a file is `NotFound`
pub async fn stat_file(path: &Path) -> Result<FileMeta, ServeError> {
    let metadata = fs::metadata(path).await.map_err(|_| ServeError::NotFound)?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    Ok(FileMeta {
        len: metadata.len(),
        content_type: mime::content_type_for(path),
        modified: metadata.modified().ok(),
    })
}

/// Read exactly the bytes of `range`
pub async fn read_range(path: &Path, range: ByteRange) -> std::io::Result<Bytes> {
    let mut file = fs::File::open(path).await?;
    file.seek(SeekFrom::Start(range.start)).await?;

    let mut buf = Vec::with_capacity(usize::try_from(range.len()).unwrap_or_default());
    file.take(range.len()).read_to_end(&mut buf).await?;
    if buf.len() as u64 != range.len() {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    Ok(Bytes::from(buf))
}

/// Serve one file request
pub async fn serve(
    ctx: &RequestContext,
    static_dir: &Path,
    request: &FileRequest,
) -> Response<Full<Bytes>> {
    let path = match resolve_file(static_dir, request) {
        Ok(path) => path,
        Err(e) => {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: project '{}', path '{}'",
                request.project, request.path
            ));
            return error_response(&e);
        }
    };

    match stat_file(&path).await {
        Ok(meta) => build_static_file_response(ctx, &path, &meta).await,
        Err(e) => {
            logger::log_debug(&format!("No file at {}", path.display()));
            error_response(&e)
        }
    }
}

pub fn error_response(error: &ServeError) -> Response<Full<Bytes>> {
    match error {
        ServeError::NotFound => http::build_404_response(),
        ServeError::Forbidden => http::build_403_response(),
    }
}

/// Build file response with `ETag`, `Last-Modified` and Range support
async fn build_static_file_response(
    ctx: &RequestContext,
    path: &Path,
    meta: &FileMeta,
) -> Response<Full<Bytes>> {
    let validators = meta.validators();

    // If-None-Match takes precedence over If-Modified-Since
    let not_modified = if ctx.if_none_match.is_some() {
        cache::check_etag_match(ctx.if_none_match.as_deref(), &validators.etag)
    } else {
        meta.modified
            .is_some_and(|m| cache::not_modified_since(ctx.if_modified_since.as_deref(), m))
    };
    if not_modified {
        return http::build_304_response(&validators);
    }

    match http::parse_byte_range(ctx.range_header.as_deref(), meta.len) {
        RangeOutcome::Unsatisfiable => http::build_416_response(meta.len),
        RangeOutcome::Partial(range) => {
            let body = if ctx.is_head {
                Bytes::new()
            } else {
                match read_range(path, range).await {
                    Ok(body) => body,
                    Err(e) => return read_failed(path, &e),
                }
            };
            http::response::build_partial_response(
                body,
                range,
                meta.len,
                meta.content_type,
                &validators,
            )
        }
        RangeOutcome::Full => {
            if ctx.is_head {
                return http::response::build_file_response(
                    Bytes::new(),
                    meta.len,
                    meta.content_type,
                    &validators,
                );
            }
            match fs::read(path).await {
                Ok(content) => {
                    let len = content.len() as u64;
                    http::response::build_file_response(
                        Bytes::from(content),
                        len,
                        meta.content_type,
                        &validators,
                    )
                }
                Err(e) => read_failed(path, &e),
            }
        }
    }
}

fn read_failed(path: &Path, error: &std::io::Error) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("Failed to read file '{}': {error}", path.display()));
    error_response(&ServeError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn request(project: &str, path: &str) -> FileRequest {
        FileRequest {
            project: project.to_string(),
            path: path.to_string(),
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("proj1/images")).unwrap();
        std::fs::write(dir.path().join("proj1/images/a.png"), b"\x89PNG fake").unwrap();
        dir
    }

    #[test]
    fn test_resolve_joins_project_and_path() {
        let root = Path::new("/data");
        assert_eq!(
            resolve_file(root, &request("proj1", "images/a.png")).unwrap(),
            PathBuf::from("/data/proj1/images/a.png")
        );
        assert_eq!(
            resolve_file(root, &request("proj1", "/./images/a.png")).unwrap(),
            PathBuf::from("/data/proj1/images/a.png")
        );
    }

    #[test]
    fn test_resolve_blocks_traversal() {
        let root = Path::new("/data");
        assert_eq!(
            resolve_file(root, &request("proj1", "../proj2/a.png")),
            Err(ServeError::Forbidden)
        );
        assert_eq!(
            resolve_file(root, &request("proj1", "images/../../x")),
            Err(ServeError::Forbidden)
        );
        assert_eq!(
            resolve_file(root, &request("..", "etc/passwd")),
            Err(ServeError::Forbidden)
        );
        assert_eq!(
            resolve_file(root, &request(".", "proj2/a.png")),
            Err(ServeError::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_stat_existing_file() {
        let dir = fixture();
        let meta = stat_file(&dir.path().join("proj1/images/a.png")).await.unwrap();
        assert_eq!(meta.len, 9);
        assert_eq!(meta.content_type, "image/png");
        assert!(meta.modified.is_some());
    }

    #[tokio::test]
    async fn test_stat_missing_or_directory() {
        let dir = fixture();
        assert_eq!(
            stat_file(&dir.path().join("proj1/images/b.png")).await.unwrap_err(),
            ServeError::NotFound
        );
        assert_eq!(
            stat_file(&dir.path().join("proj1/images")).await.unwrap_err(),
            ServeError::NotFound
        );
    }

    #[tokio::test]
    async fn test_read_range_seeks() {
        let dir = fixture();
        let path = dir.path().join("proj1/images/a.png");
        let body = read_range(&path, ByteRange { start: 5, end: 8 }).await.unwrap();
        assert_eq!(&body[..], b"fake");

        let past_end = read_range(&path, ByteRange { start: 5, end: 20 }).await;
        assert_eq!(
            past_end.unwrap_err().kind(),
            std::io::ErrorKind::UnexpectedEof
        );
    }

    #[tokio::test]
    async fn test_head_and_304_carry_metadata_validators() {
        let dir = fixture();
        let path = dir.path().join("proj1/images/a.png");
        let expected = stat_file(&path).await.unwrap().validators();

        let ctx = RequestContext {
            is_head: true,
            ..RequestContext::default()
        };
        let head = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(head.status(), 200);
        assert_eq!(head.headers()["etag"], expected.etag.as_str());
        assert_eq!(
            head.headers()["last-modified"],
            expected.last_modified.as_deref().unwrap()
        );
        assert_eq!(head.headers()["content-length"], "9");
        let body = head.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());

        let ctx = RequestContext {
            if_none_match: Some(expected.etag.clone()),
            ..RequestContext::default()
        };
        let not_modified = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(not_modified.status(), 304);
        assert_eq!(not_modified.headers()["etag"], expected.etag.as_str());

        // A rewrite with a different length invalidates the tag
        std::fs::write(&path, b"\x89PNG larger fake").unwrap();
        let changed = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(changed.status(), 200);
        assert_ne!(changed.headers()["etag"], expected.etag.as_str());
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let dir = fixture();
        let ctx = RequestContext::default();
        let first = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(first.status(), 200);
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let ctx = RequestContext {
            if_none_match: Some(etag),
            ..RequestContext::default()
        };
        let second = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(second.status(), 304);
        let body = second.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_if_modified_since_revalidation() {
        let dir = fixture();
        let first = serve(
            &RequestContext::default(),
            dir.path(),
            &request("proj1", "images/a.png"),
        )
        .await;
        let last_modified = first.headers()["last-modified"].to_str().unwrap().to_string();

        let ctx = RequestContext {
            if_modified_since: Some(last_modified),
            ..RequestContext::default()
        };
        let second = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(second.status(), 304);
    }

    #[tokio::test]
    async fn test_range_request() {
        let dir = fixture();
        let ctx = RequestContext {
            range_header: Some("bytes=1-3".to_string()),
            ..RequestContext::default()
        };
        let resp = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["content-range"], "bytes 1-3/9");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"PNG");

        let ctx = RequestContext {
            is_head: true,
            range_header: Some("bytes=-4".to_string()),
            ..RequestContext::default()
        };
        let resp = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["content-length"], "4");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());

        let ctx = RequestContext {
            range_header: Some("bytes=500-".to_string()),
            ..RequestContext::default()
        };
        let resp = serve(&ctx, dir.path(), &request("proj1", "images/a.png")).await;
        assert_eq!(resp.status(), 416);
    }
}
