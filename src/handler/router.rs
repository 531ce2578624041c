//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, static files,
//! then the entry document fallback.

use crate::handler::static_files;
use crate::hosting::BundleHost;
use crate::http::{self, HostResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body as _;
use hyper::header::{IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    host: Arc<BundleHost>,
    peer_addr: SocketAddr,
) -> Result<HostResponse, Infallible> {
    let started = Instant::now();
    // Owned copies only, so no borrow of the request lives across an await
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let if_none_match = header_string(&req, IF_NONE_MATCH);

    let response = match method {
        Method::GET | Method::HEAD => match decode_path(&path) {
            Some(decoded) => {
                let ctx = RequestContext {
                    path: &decoded,
                    is_head: method == Method::HEAD,
                    if_none_match,
                };
                route_request(&ctx, &host).await
            }
            None => {
                logger::log_warning(&format!("Undecodable request path: {path}"));
                http::build_404_response()
            }
        },
        Method::OPTIONS => http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    };

    if let Some(format) = host.access_log {
        let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.http_version = http_version(&req).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.referer = header_string(&req, REFERER);
        entry.user_agent = header_string(&req, USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, format);
    }

    Ok(response)
}

/// Static files first; extensionless paths then fall back to the entry document
async fn route_request(ctx: &RequestContext<'_>, host: &BundleHost) -> HostResponse {
    if let Some(response) = static_files::serve(&host.static_files, ctx.path, ctx).await {
        return response;
    }

    if let Some(route) = host.fallback.as_ref().filter(|r| r.matches(ctx.path)) {
        if let Some(response) = static_files::serve(route.options(), route.document(), ctx).await
        {
            return response;
        }
    }

    http::build_404_response()
}

/// Percent-decode the URI path once, before any provider sees it
///
/// Invalid UTF-8 and embedded NUL bytes have no file to match.
fn decode_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if decoded.contains('\0') {
        return None;
    }
    Some(decoded.into_owned())
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn http_version<B>(req: &Request<B>) -> &'static str {
    match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BundleConfig;
    use crate::content::StaticFileOptions;
    use crate::hosting::RegisteredBundles;
    use http_body_util::BodyExt;
    use hyper::header::{CACHE_CONTROL, CONTENT_TYPE};
    use hyper::StatusCode;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct Site {
        dir: TempDir,
        host: Arc<BundleHost>,
    }

    /// One bundle (dist + wwwroot) and a server root
    fn site() -> Site {
        let dir = TempDir::new().unwrap();
        let files = [
            ("client/dist/_framework/client.dll", "MZ"),
            ("client/dist/_framework/client.pdb", "PDB"),
            ("client/wwwroot/index.html", "<html>client</html>"),
            ("client/wwwroot/css/app.css", "body{}"),
            ("server/robots.txt", "User-agent: *"),
            ("server/index.html", "<html>server</html>"),
            ("client/dist/my app.js", "spaced"),
            ("client/dist/caf\u{e9}.png", "png"),
            ("client/secret.txt", "secret"),
        ];
        for (path, body) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }

        let bundle = BundleConfig {
            artifact_path: dir.path().join("client/client.wasm"),
            dist_path: dir.path().join("client/dist"),
            web_root_path: Some(dir.path().join("client/wwwroot")),
            enable_debugging: false,
        };
        let bundles = RegisteredBundles::from_configs([bundle]);
        let host = BundleHost::new(
            &bundles,
            StaticFileOptions::default(),
            &dir.path().join("server"),
        );
        Site {
            dir,
            host: Arc::new(host),
        }
    }

    async fn send(site: &Site, method: Method, path: &str) -> (StatusCode, HostResponse) {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap();
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let response = handle_request(req, Arc::clone(&site.host), peer)
            .await
            .unwrap();
        (response.status(), response)
    }

    async fn text(response: HostResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_across_content_roots() {
        let site = site();

        let (status, response) = send(&site, Method::GET, "/_framework/client.dll").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");

        let (status, response) = send(&site, Method::GET, "/css/app.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text(response).await, "body{}");

        let (status, response) = send(&site, Method::GET, "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text(response).await, "User-agent: *");
    }

    #[tokio::test]
    async fn test_debug_symbols_hidden_without_debugging() {
        let site = site();
        let (status, _) = send(&site, Method::GET, "/_framework/client.pdb").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_routes_fall_back_to_entry_document() {
        let site = site();

        for path in ["/", "/counter", "/users/42"] {
            let (status, response) = send(&site, Method::GET, path).await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");
            assert_eq!(text(response).await, "<html>client</html>");
        }
    }

    #[tokio::test]
    async fn test_missing_files_are_not_found() {
        let site = site();
        let (status, _) = send(&site, Method::GET, "/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&site, Method::GET, "/../secret.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/my%20app.js").as_deref(), Some("/my app.js"));
        assert_eq!(decode_path("/plain.css").as_deref(), Some("/plain.css"));
        assert_eq!(decode_path("/%FF%FE"), None);
        assert_eq!(decode_path("/a%00.js"), None);
    }

    #[tokio::test]
    async fn test_percent_encoded_names_are_served() {
        let site = site();

        let (status, response) = send(&site, Method::GET, "/my%20app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text(response).await, "spaced");

        let (status, response) = send(&site, Method::GET, "/caf%C3%A9.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text(response).await, "png");
    }

    #[tokio::test]
    async fn test_encoded_traversal_and_bad_bytes_rejected() {
        let site = site();
        for path in [
            "/%2e%2e/secret.txt",
            "/%2E%2E%2Fsecret.txt",
            "/_framework/%2e%2e/%2e%2e/secret.txt",
            "/%FF.js",
            "/app%00.js",
        ] {
            let (status, _) = send(&site, Method::GET, path).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_decorators_run_once_per_request() {
        let site = site();
        let mut host = (*site.host).clone();
        let static_hits = Arc::new(AtomicUsize::new(0));
        let fallback_hits = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&static_hits);
        host.static_files.on_prepare_response.push(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        let hits = Arc::clone(&fallback_hits);
        host.fallback
            .as_mut()
            .unwrap()
            .options_mut()
            .on_prepare_response
            .push(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        let site = Site {
            host: Arc::new(host),
            ..site
        };
        let counts = || {
            (
                static_hits.load(Ordering::SeqCst),
                fallback_hits.load(Ordering::SeqCst),
            )
        };

        // Static lookup misses, only the fallback decorates
        let (status, response) = send(&site, Method::GET, "/counter").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers().get_all(CACHE_CONTROL).iter().count(), 1);
        assert_eq!(counts(), (0, 1));

        let (status, _) = send(&site, Method::GET, "/css/app.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts(), (1, 1));

        let (status, _) = send(&site, Method::GET, "/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(counts(), (1, 1));

        let (status, _) = send(&site, Method::HEAD, "/users/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts(), (1, 2));
    }

    #[tokio::test]
    async fn test_method_handling() {
        let site = site();
        let (status, _) = send(&site, Method::POST, "/counter").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (status, _) = send(&site, Method::OPTIONS, "/").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, response) = send(&site, Method::HEAD, "/css/app.css").await;
        assert_eq!(status, StatusCode::OK);
        assert!(text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_without_bundles_serves_ambient_root() {
        let site = site();
        let host = BundleHost::new(
            &RegisteredBundles::default(),
            StaticFileOptions::default(),
            &site.dir.path().join("server"),
        );
        let site = Site {
            host: Arc::new(host),
            ..site
        };

        let (status, _) = send(&site, Method::GET, "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&site, Method::GET, "/_framework/client.dll").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&site, Method::GET, "/counter").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
