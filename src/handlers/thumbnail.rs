use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Extension, Json,
};

use crate::error::{LogErr, Result};
use crate::models::{CurrentUser, Video};
use crate::services::thumbnail::THUMBNAIL_FIELD;
use crate::services::{ThumbnailService, UploadValidator};
use crate::AppState;

/// Upload a video thumbnail
/// POST /api/videos/{video_id}/thumbnail
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>> {
    let mut multipart = multipart.log_bad_request("Unable to parse form file")?;

    let upload =
        UploadValidator::extract(&mut multipart, THUMBNAIL_FIELD, &state.config.upload).await?;

    let video = ThumbnailService::attach(
        state.videos.as_ref(),
        state.storage.as_ref(),
        &state.config,
        &current_user,
        &video_id,
        upload,
    )
    .await?;

    Ok(Json(video))
}
