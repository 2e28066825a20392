use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::{LogErr, Result};
use crate::models::{CreateVideoRequest, CurrentUser, Video};
use crate::services::VideoService;
use crate::AppState;

/// Create a video
/// POST /api/videos
pub async fn create_video(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    req: std::result::Result<Json<CreateVideoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Video>)> {
    let Json(req) = req.log_bad_request("Invalid request body")?;
    let video = VideoService::create(state.videos.as_ref(), &current_user, req).await?;
    Ok((StatusCode::CREATED, Json(video)))
}

/// List the current user's videos
/// GET /api/videos
pub async fn list_videos(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<Vec<Video>>> {
    let videos = VideoService::list(state.videos.as_ref(), &current_user).await?;
    Ok(Json(videos))
}

/// Get a video
/// GET /api/videos/{video_id}
pub async fn get_video(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
) -> Result<Json<Video>> {
    let video = VideoService::get_owned(state.videos.as_ref(), &current_user, &video_id).await?;
    Ok(Json(video))
}
