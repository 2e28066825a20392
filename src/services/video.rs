use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, LogErr, Result};
use crate::models::{CreateVideoRequest, CurrentUser, Video};

/// Persistent video metadata store
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn create_video(&self, video: &Video) -> Result<()>;

    /// Fails with `AppError::NotFound` when no such video exists
    async fn get_video(&self, id: &str) -> Result<Video>;

    /// Videos owned by `user_id`, newest first
    async fn list_videos(&self, user_id: &str) -> Result<Vec<Video>>;

    async fn update_video(&self, video: &Video) -> Result<()>;
}

/// Video service
pub struct VideoService;

impl VideoService {
    /// Create a video owned by the current user
    pub async fn create(
        store: &dyn VideoStore,
        current_user: &CurrentUser,
        req: CreateVideoRequest,
    ) -> Result<Video> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }

        let video = Video::new(&current_user.id, title, req.description);
        store
            .create_video(&video)
            .await
            .log_internal("Couldn't create video")?;

        tracing::info!("Created video {} for user {}", video.id, current_user.id);
        Ok(video)
    }

    /// Parse a video id taken from the request path.
    /// A malformed id is reported as an internal error.
    pub fn parse_id(raw: &str) -> Result<String> {
        Uuid::parse_str(raw)
            .map(|id| id.to_string())
            .log_internal("Unable to parse video id")
    }

    /// Load a video by its raw path id. Not-found passes through, any other failure is internal.
    pub async fn load(store: &dyn VideoStore, raw_id: &str) -> Result<Video> {
        let id = Self::parse_id(raw_id)?;
        match store.get_video(&id).await {
            Ok(video) => Ok(video),
            Err(AppError::NotFound(msg)) => Err(AppError::NotFound(msg)),
            Err(e) => Err(e).log_internal("Unable to get video metadata"),
        }
    }

    /// Check that the current user owns the video
    pub fn ensure_owner(video: &Video, current_user: &CurrentUser) -> Result<()> {
        if !video.is_owned_by(&current_user.id) {
            tracing::warn!(
                "User {} attempted to modify video {} owned by {}",
                current_user.id,
                video.id,
                video.user_id
            );
            return Err(AppError::Forbidden("You don't own this video".to_string()));
        }
        Ok(())
    }

    /// Get a video the current user owns
    pub async fn get_owned(
        store: &dyn VideoStore,
        current_user: &CurrentUser,
        raw_id: &str,
    ) -> Result<Video> {
        let video = Self::load(store, raw_id).await?;
        Self::ensure_owner(&video, current_user)?;
        Ok(video)
    }

    /// List the current user's videos
    pub async fn list(store: &dyn VideoStore, current_user: &CurrentUser) -> Result<Vec<Video>> {
        store
            .list_videos(&current_user.id)
            .await
            .log_internal("Couldn't list videos")
    }
}
