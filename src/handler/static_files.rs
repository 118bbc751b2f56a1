//! Static file serving module
//!
//! The asset responder: resolves a request path under the Root Directory,
//! classifies it by extension and answers with the file's bytes. Range
//! requests, `If-Modified-Since` and error statuses are handled here as well.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, conditional, mime, range::RangeParseResult, response::FileBody};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Reasons a request path does not end in a served file
#[derive(Debug)]
pub enum ServeError {
    /// Path is not valid UTF-8 after decoding, or contains a `..` segment
    BadPath,
    /// Permission denied, or the resolved file lies outside the root
    Forbidden,
    NotFound,
    Io(io::Error),
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadPath => write!(f, "invalid request path"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not found"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ServeError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Io(e),
        }
    }
}

impl ServeError {
    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::BadPath => http::build_400_response(),
            Self::Forbidden => http::build_403_response(),
            Self::NotFound => http::build_404_response(),
            Self::Io(_) => http::build_500_response(),
        }
    }
}

/// Where a request path leads
#[derive(Debug, PartialEq, Eq)]
pub enum Target {
    /// A regular file inside the root
    ///
    /// `served` is the path as requested (or the chosen index file) and
    /// decides the Content-Type; `canonical` is what gets read.
    File { served: PathBuf, canonical: PathBuf },
    /// A directory requested without its trailing slash
    Redirect(String),
}

/// The Root Directory all request paths are joined onto
#[derive(Debug)]
pub struct AssetRoot {
    dir: PathBuf,
    canonical: Option<PathBuf>,
}

impl AssetRoot {
    /// Capture the root, canonicalizing it if it already exists
    ///
    /// A missing root is not fatal: every request answers 404 until the
    /// build output shows up.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let canonical = match dir.canonicalize() {
            Ok(p) => Some(p),
            Err(e) => {
                logger::log_warning(&format!(
                    "Asset directory not found or inaccessible '{}': {e}",
                    dir.display()
                ));
                None
            }
        };
        Self { dir, canonical }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn canonical(&self) -> Result<PathBuf, ServeError> {
        match &self.canonical {
            Some(p) => Ok(p.clone()),
            None => Ok(fs::canonicalize(&self.dir).await?),
        }
    }

    /// Map a raw request path to a file under the root
    pub async fn resolve(
        &self,
        request_path: &str,
        index_files: &[String],
    ) -> Result<Target, ServeError> {
        let decoded = decode_path(request_path)?;
        let mut candidate = self.dir.join(decoded.trim_start_matches('/'));

        if fs::metadata(&candidate).await?.is_dir() {
            if !request_path.ends_with('/') {
                return Ok(Target::Redirect(directory_location(request_path)));
            }
            candidate = find_index(&candidate, index_files)
                .await
                .ok_or(ServeError::NotFound)?;
        }

        let resolved = fs::canonicalize(&candidate).await?;
        let root = self.canonical().await?;
        if !resolved.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {request_path} -> {}",
                resolved.display()
            ));
            return Err(ServeError::Forbidden);
        }

        Ok(Target::File {
            served: candidate,
            canonical: resolved,
        })
    }
}

/// `Location` for a directory requested without its trailing slash
///
/// Leading slashes collapse to one so the value never reads as a
/// protocol-relative URL (`//host/`).
fn directory_location(request_path: &str) -> String {
    format!("/{}/", request_path.trim_start_matches(['/', '\\']))
}

/// Percent-decode a request path and reject `..` segments
fn decode_path(path: &str) -> Result<String, ServeError> {
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ServeError::BadPath)?;

    if decoded.contains('\0') || decoded.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(ServeError::BadPath);
    }

    Ok(decoded.into_owned())
}

/// First index file that exists as a regular file in `dir`
async fn find_index(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for index_file in index_files {
        let path = dir.join(index_file);
        if fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            return Some(path);
        }
    }
    None
}

/// Serve the asset a request path points at
pub async fn serve_asset(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let redirect_target = |target: String| match ctx.query {
        Some(query) => format!("{target}?{query}"),
        None => target,
    };

    match state
        .root
        .resolve(ctx.path, &state.config.assets.index_files)
        .await
    {
        Ok(Target::File { served, canonical }) => {
            match load_file(ctx, state, &served, &canonical).await {
                Ok(resp) => resp,
                Err(e) => error_response(ctx.path, e),
            }
        }
        Ok(Target::Redirect(target)) => http::build_redirect_response(&redirect_target(target)),
        Err(e) => error_response(ctx.path, e),
    }
}

fn error_response(path: &str, error: ServeError) -> Response<Full<Bytes>> {
    if let ServeError::Io(ref e) = error {
        logger::log_error(&format!("Failed to serve '{path}': {e}"));
    }
    error.into_response()
}

/// Read a resolved file and build the 200/206/304/416 response for it
async fn load_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
    served: &Path,
    canonical: &Path,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let content_type = mime::content_type_for(served, &state.config.http.fallback_content_type);
    let metadata = fs::metadata(canonical).await?;
    let modified = metadata.modified().ok();

    if modified.is_some_and(|m| conditional::is_not_modified(ctx.if_modified_since, m)) {
        let last_modified = modified.map(conditional::format_http_date);
        return Ok(http::build_304_response(last_modified.as_deref()));
    }

    let data = Bytes::from(fs::read(canonical).await?);
    let total_size = data.len();
    let file = FileBody {
        data,
        content_type,
        last_modified: modified.map(conditional::format_http_date),
        is_head: ctx.is_head,
    };

    Ok(match http::parse_range_header(ctx.range_header, total_size) {
        RangeParseResult::Valid(range) => http::response::build_partial_response(file, range),
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::None => http::response::build_file_response(file),
    })
}
