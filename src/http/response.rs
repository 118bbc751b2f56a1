//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN};
use hyper::{Response, StatusCode};

use super::range::ByteRange;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// File payload plus the metadata every successful response carries
pub struct FileBody<'a> {
    pub data: Bytes,
    pub content_type: &'a str,
    pub last_modified: Option<String>,
    pub is_head: bool,
}

/// Build a plain-text error response
pub fn build_error_response(status: StatusCode) -> Response<Full<Bytes>> {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("X-Content-Type-Options", "nosniff")
        .body(Full::new(Bytes::from(text)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback_response(status)
        })
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::BAD_REQUEST)
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::FORBIDDEN)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND)
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = build_error_response(StatusCode::METHOD_NOT_ALLOWED);
    resp.headers_mut()
        .insert("Allow", HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS)
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", "Content-Type, Range")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            fallback_response(StatusCode::NO_CONTENT)
        })
}

/// Build 301 redirect response
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header("Location", target)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            build_404_response()
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    if let Some(value) = last_modified {
        builder = builder.header("Last-Modified", value);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        fallback_response(StatusCode::NOT_MODIFIED)
    })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> Response<Full<Bytes>> {
    let mut resp = build_error_response(StatusCode::RANGE_NOT_SATISFIABLE);
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{file_size}")) {
        resp.headers_mut().insert("Content-Range", value);
    }
    resp
}

/// Build 200 OK response with the whole file
pub fn build_file_response(file: FileBody<'_>) -> Response<Full<Bytes>> {
    let content_length = file.data.len();
    let body = if file.is_head { Bytes::new() } else { file.data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", file.content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes");
    if let Some(ref value) = file.last_modified {
        builder = builder.header("Last-Modified", value);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        build_500_response()
    })
}

/// Build 206 Partial Content response
pub fn build_partial_response(file: FileBody<'_>, range: ByteRange) -> Response<Full<Bytes>> {
    let total_size = file.data.len();
    let body = if file.is_head {
        Bytes::new()
    } else {
        file.data.slice(range.start..=range.end)
    };

    let mut builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header("Content-Type", file.content_type)
        .header("Content-Length", range.len())
        .header(
            "Content-Range",
            format!("bytes {}-{}/{total_size}", range.start, range.end),
        )
        .header("Accept-Ranges", "bytes");
    if let Some(ref value) = file.last_modified {
        builder = builder.header("Last-Modified", value);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("206", &e);
        build_500_response()
    })
}

/// Attach `Access-Control-Allow-Origin` to any response
pub fn with_allow_origin(
    mut resp: Response<Full<Bytes>>,
    allow_origin: &HeaderValue,
) -> Response<Full<Bytes>> {
    resp.headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin.clone());
    resp
}

fn fallback_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn sample(is_head: bool) -> FileBody<'static> {
        FileBody {
            data: Bytes::from_static(b"0123456789"),
            content_type: "application/wasm",
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT".to_string()),
            is_head,
        }
    }

    #[tokio::test]
    async fn test_error_response() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()["Content-Type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_bytes(resp).await, "404 Not Found");
    }

    #[test]
    fn test_405_has_allow() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], ALLOWED_METHODS);
    }

    #[tokio::test]
    async fn test_file_response() {
        let resp = build_file_response(sample(false));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/wasm");
        assert_eq!(resp.headers()["Content-Length"], "10");
        assert_eq!(resp.headers()["Accept-Ranges"], "bytes");
        assert_eq!(
            resp.headers()["Last-Modified"],
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
        assert_eq!(body_bytes(resp).await, "0123456789");
    }

    #[tokio::test]
    async fn test_head_keeps_length() {
        let resp = build_file_response(sample(true));
        assert_eq!(resp.headers()["Content-Length"], "10");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_response() {
        let resp = build_partial_response(sample(false), ByteRange { start: 2, end: 4 });
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()["Content-Range"], "bytes 2-4/10");
        assert_eq!(resp.headers()["Content-Length"], "3");
        assert_eq!(body_bytes(resp).await, "234");
    }

    #[test]
    fn test_416_content_range() {
        let resp = build_416_response(10);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()["Content-Range"], "bytes */10");
    }

    #[test]
    fn test_with_allow_origin() {
        let origin = HeaderValue::from_static("*");
        let resp = with_allow_origin(build_400_response(), &origin);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
