//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, the single
//! catch-all asset route, the cross-origin header and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_TYPE, IF_MODIFIED_SINCE, RANGE};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: req.method() == Method::HEAD,
            if_modified_since: header_str(req, &IF_MODIFIED_SINCE),
            range_header: header_str(req, &RANGE),
        }
    }
}

fn header_str<'a, B>(req: &'a Request<B>, name: &HeaderName) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Main entry point for HTTP request handling
///
/// Generic over the body type since request bodies are never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let req = req.map(drop);

    let response = match check_http_method(req.method()) {
        Some(resp) => resp,
        None => static_files::serve_asset(&RequestContext::from_request(&req), &state).await,
    };
    let response = http::with_allow_origin(response, &state.allow_origin);

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::from_request(remote_addr, &req);
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.finish(
            response.status().as_u16(),
            body_bytes,
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            started.elapsed(),
        );
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => Some(http::build_405_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn state_for(dir: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::default();
        config.assets.root_dir = dir.to_string_lossy().into_owned();
        Arc::new(AppState::new(config).unwrap())
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(state), addr()).await.unwrap()
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_request_context() {
        let req = Request::builder()
            .method("HEAD")
            .uri("/zigtris.wasm?v=1")
            .header("range", "bytes=0-3")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.path, "/zigtris.wasm");
        assert_eq!(ctx.query, Some("v=1"));
        assert!(ctx.is_head);
        assert_eq!(ctx.range_header, Some("bytes=0-3"));
        assert_eq!(ctx.if_modified_since, None);
    }

    #[tokio::test]
    async fn test_serves_with_content_type_and_cors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zigtris.js"), "start();").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, get("/zigtris.js")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/javascript");
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "start();");
    }

    #[tokio::test]
    async fn test_errors_keep_cors() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, get("/nope.wasm")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");

        let resp = send(&state, get("/../Cargo.toml")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_methods() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        let post = Request::builder().method("POST").uri("/").body(()).unwrap();
        let resp = send(&state, post).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "GET, HEAD, OPTIONS");
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");

        let options = Request::builder().method("OPTIONS").uri("/").body(()).unwrap();
        let resp = send(&state, options).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_custom_allow_origin() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.assets.root_dir = dir.path().to_string_lossy().into_owned();
        config.http.allow_origin = "http://localhost:3000".to_string();
        let state = Arc::new(AppState::new(config).unwrap());

        let resp = send(&state, get("/")).await;
        assert_eq!(
            resp.headers()["Access-Control-Allow-Origin"],
            "http://localhost:3000"
        );
    }
}
