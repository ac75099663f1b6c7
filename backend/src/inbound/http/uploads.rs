//! Image upload endpoints.
//!
//! ```text
//! POST /api/upload         single image (authenticated)
//! POST /api/upload-photos  up to five images for reviews and comments
//! ```
//!
//! Only image extensions pass (png, jpg, jpeg, gif, webp); each photo is
//! capped at 5 MB and a whole request at 16 MB. Stored files get generated
//! names and are served from the uploads directory as stable URLs.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, post, web};
use futures_util::StreamExt as _;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ApiResult, Error};

use super::auth::AuthContext;
use super::state::HttpState;

/// Accepted image file extensions.
const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Per-photo size cap.
const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Whole-request size cap.
const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

/// Maximum photos per batch upload.
const MAX_PHOTOS: usize = 5;

/// Single upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Stable retrieval URL.
    pub url: String,
    /// Generated file name.
    pub filename: String,
}

/// Batch upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PhotosResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Generated file names, in upload order.
    pub files: Vec<String>,
    /// Stable retrieval URLs, in upload order.
    pub urls: Vec<String>,
}

/// Extract and validate the extension of an uploaded file name.
fn allowed_extension(filename: &str) -> Result<String, Error> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| Error::invalid_request("Invalid file type"))?;
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(Error::invalid_request("Invalid file type"))
    }
}

/// One validated file pulled out of a multipart stream.
struct IncomingFile {
    extension: String,
    bytes: Vec<u8>,
}

/// Drain a multipart stream, validating extensions and size caps.
///
/// Fields without a file name (plain form values) are skipped.
async fn collect_files(mut payload: Multipart) -> Result<Vec<IncomingFile>, Error> {
    let mut files = Vec::new();
    let mut request_bytes = 0usize;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|err| Error::invalid_request(format!("malformed upload: {err}")))?;
        let Some(filename) = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned)
        else {
            continue;
        };
        if filename.is_empty() {
            continue;
        }
        let extension = allowed_extension(&filename)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|err| Error::invalid_request(format!("malformed upload: {err}")))?;
            bytes.extend_from_slice(&chunk);
            if bytes.len() > MAX_PHOTO_BYTES {
                return Err(Error::invalid_request("File size too large (max 5MB)"));
            }
            request_bytes += chunk.len();
            if request_bytes > MAX_REQUEST_BYTES {
                return Err(Error::invalid_request("Request body too large (max 16MB)"));
            }
        }
        files.push(IncomingFile { extension, bytes });
    }

    Ok(files)
}

/// Upload a single image (logo, cover, avatar).
#[utoipa::path(
    post,
    path = "/api/upload",
    responses(
        (status = 200, description = "Stored file URL", body = UploadResponse),
        (status = 400, description = "No file, wrong type, or too large", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["uploads"]
)]
#[post("/upload")]
pub async fn upload_file(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: Multipart,
) -> ApiResult<web::Json<UploadResponse>> {
    auth.require_user_id()?;

    let mut files = collect_files(payload).await?;
    let Some(file) = files.pop() else {
        return Err(Error::invalid_request("No file provided"));
    };

    let stored = state.uploads.save(&file.extension, file.bytes).await?;
    Ok(web::Json(UploadResponse {
        url: stored.url,
        filename: stored.filename,
    }))
}

/// Upload up to five photos for a review or comment.
///
/// Anonymous callers may attach photos, consistent with comment-without-login.
#[utoipa::path(
    post,
    path = "/api/upload-photos",
    responses(
        (status = 200, description = "Stored file names and URLs", body = PhotosResponse),
        (status = 400, description = "Too many photos, wrong type, or too large", body = Error)
    ),
    tags = ["uploads"]
)]
#[post("/upload-photos")]
pub async fn upload_photos(
    state: web::Data<HttpState>,
    payload: Multipart,
) -> ApiResult<web::Json<PhotosResponse>> {
    let files = collect_files(payload).await?;
    if files.is_empty() {
        return Err(Error::invalid_request("No photos provided"));
    }
    if files.len() > MAX_PHOTOS {
        return Err(Error::invalid_request("Maximum 5 photos allowed"));
    }

    let mut names = Vec::with_capacity(files.len());
    let mut urls = Vec::with_capacity(files.len());
    for file in files {
        let stored = state.uploads.save(&file.extension, file.bytes).await?;
        names.push(stored.filename);
        urls.push(stored.url);
    }

    Ok(web::Json(PhotosResponse {
        message: "Photos uploaded successfully".to_owned(),
        files: names,
        urls,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("logo.png", "png")]
    #[case("photo.JPG", "jpg")]
    #[case("anim.webp", "webp")]
    fn image_extensions_pass(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(allowed_extension(filename).expect("allowed"), expected);
    }

    #[rstest]
    #[case("script.exe")]
    #[case("archive.tar.xz")]
    #[case("noextension")]
    fn other_extensions_are_rejected(#[case] filename: &str) {
        let error = allowed_extension(filename).expect_err("rejected");
        assert_eq!(error.code, crate::domain::ErrorCode::InvalidRequest);
    }
}
