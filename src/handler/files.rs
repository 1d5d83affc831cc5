//! List and download handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::router::RequestContext;
use crate::config::AppState;
use crate::errors::Error;
use crate::http::range::{self, RangeOutcome};
use crate::http::response::{
    file_response, not_modified_response, partial_response, range_not_satisfiable_response,
    FileHeaders,
};
use crate::http::{cache, json_response, mime, path};

/// JSON array with the name of every stored file
pub async fn list_files(state: &AppState) -> Result<Response<Full<Bytes>>, Error> {
    let names = state.store.list().await?;
    Ok(json_response(StatusCode::OK, &names))
}

/// Serve the stored file named by the (still percent-encoded) path segment
pub async fn download_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
    encoded_name: &str,
) -> Result<Response<Full<Bytes>>, Error> {
    let name = path::percent_decode(encoded_name).ok_or(Error::FileNotFound)?;
    let file = state.store.read(&name).await?;

    let etag = cache::generate_etag(&file.content);
    let last_modified = file.modified.map(cache::http_date);
    let headers = FileHeaders {
        content_type: mime::content_type_for(&file.name),
        etag: &etag,
        last_modified: last_modified.as_deref(),
    };

    let not_modified = match ctx.if_none_match.as_deref() {
        Some(tags) => cache::etag_matches(Some(tags), &etag),
        None => file
            .modified
            .is_some_and(|m| cache::not_modified_since(ctx.if_modified_since.as_deref(), m)),
    };
    if not_modified {
        return Ok(not_modified_response(&headers));
    }

    let total = file.content.len() as u64;
    let response = match range::parse(ctx.range_header.as_deref(), total) {
        RangeOutcome::Partial(r) => partial_response(&file.content, r, &headers, ctx.is_head),
        RangeOutcome::Unsatisfiable => range_not_satisfiable_response(total),
        RangeOutcome::Full => file_response(file.content, &headers, ctx.is_head),
    };
    Ok(response)
}
