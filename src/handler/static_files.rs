//! Static file serving module
//!
//! Resolves a subpath through `StaticFileOptions` and builds the response:
//! content type, validators, decorators, then the body.

use crate::content::{FileProvider, ResponseContext, StaticFileOptions};
use crate::handler::router::RequestContext;
use crate::http::{self, cache, HostResponse};
use crate::logger;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::StatusCode;

/// Serve `subpath` from `options`
///
/// `None` means nothing matched and the caller may try another route.
pub async fn serve(
    options: &StaticFileOptions,
    subpath: &str,
    ctx: &RequestContext<'_>,
) -> Option<HostResponse> {
    let provider = options.file_provider.as_ref()?;
    let file = provider.file_info(subpath)?;

    let Some(content_type) = options.resolve_content_type(subpath) else {
        logger::log_debug(&format!("No content type for '{subpath}', not serving"));
        return None;
    };

    let etag = cache::generate_etag(file.length, file.last_modified);
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, CONTENT_TYPE, &content_type);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(file.length));
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    insert_header(&mut headers, ETAG, &etag);
    insert_header(&mut headers, LAST_MODIFIED, &http_date(file.last_modified.into()));

    options.on_prepare_response.apply(&mut ResponseContext {
        subpath,
        file: &file,
        headers: &mut headers,
    });

    // Check if client has cached version
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        headers.remove(CONTENT_LENGTH);
        return Some(http::build_file_response(
            StatusCode::NOT_MODIFIED,
            headers,
            Bytes::new(),
        ));
    }

    if ctx.is_head {
        return Some(http::build_file_response(StatusCode::OK, headers, Bytes::new()));
    }

    match file.read().await {
        Ok(body) => Some(http::build_file_response(StatusCode::OK, headers, body)),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file.physical_path.display()
            ));
            Some(http::build_500_response())
        }
    }
}

fn insert_header(headers: &mut HeaderMap, name: hyper::header::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(e) => logger::log_warning(&format!("Dropping header {name}: {e}")),
    }
}

/// IMF-fixdate, as used by `Last-Modified`
fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
