//! Route matching for `{static_address}/{project}/files/{path}`

/// One file request, decoded from the URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub project: String,
    pub path: String,
}

const FILES_SEGMENT: &str = "files/";

/// Match a request path against the file route
///
/// The path is percent-decoded first, then split: `project` is a single
/// non-empty segment and `path` is everything after `files/`.
pub fn match_route(static_address: &str, request_path: &str) -> Option<FileRequest> {
    let decoded = urlencoding::decode(request_path).ok()?;

    let rest = if static_address == "/" {
        &*decoded
    } else {
        decoded.strip_prefix(static_address)?
    };

    let (project, rest) = rest.strip_prefix('/')?.split_once('/')?;
    let path = rest.strip_prefix(FILES_SEGMENT)?;
    if project.is_empty() || path.is_empty() {
        return None;
    }

    Some(FileRequest {
        project: project.to_string(),
        path: path.to_string(),
    })
}
