//! Upload handler
//!
//! Streams the `file` field of a multipart body into the upload directory.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use multer::{Constraints, Field, Multipart, SizeLimit};
use serde::Serialize;

use crate::config::AppState;
use crate::errors::Error;
use crate::http;
use crate::logger;
use crate::storage::StagedUpload;

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

/// Body of a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
}

/// Store the uploaded file, replacing any file of the same name
pub async fn upload_file<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>, Error>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::BadRequest {
            message: "Expected multipart/form-data".to_string(),
        })?;
    let boundary = multer::parse_boundary(content_type)?;

    let limit = state.config.http.max_body_size;
    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(limit));
    let mut multipart =
        Multipart::with_constraints(req.into_body().into_data_stream(), boundary, constraints);

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A `file` part without a filename is a plain form value
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };

        let mut staged = state.store.stage(&filename).await?;
        if let Err(e) = copy_field(&mut field, &mut staged).await {
            logger::log_debug(&format!(
                "Upload of '{filename}' aborted after {} bytes: {e}",
                staged.written()
            ));
            staged.discard().await;
            return Err(e);
        }
        let written = staged.commit().await?;

        logger::log_upload(&filename, written);
        let url = format!("{}/{filename}", state.config.storage.public_prefix());
        return Ok(http::json_response(
            StatusCode::OK,
            &UploadResponse { filename, url },
        ));
    }

    Err(Error::MissingFile)
}

/// Stream every chunk of `field` into the staged file
async fn copy_field(field: &mut Field<'_>, staged: &mut StagedUpload) -> Result<(), Error> {
    while let Some(chunk) = field.chunk().await? {
        staged.write_chunk(&chunk).await?;
    }
    Ok(())
}

/// Reject bodies whose declared `Content-Length` is over the limit before
/// reading anything
pub fn check_declared_size<B>(req: &Request<B>, max_body_size: u64) -> Result<(), Error> {
    let Some(value) = req.headers().get(hyper::header::CONTENT_LENGTH) else {
        return Ok(());
    };
    match value.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(Error::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Some(_) => Ok(()),
        None => {
            logger::log_warning("Invalid Content-Length value, skipping size check");
            Ok(())
        }
    }
}
