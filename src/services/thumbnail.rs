use chrono::Utc;

use crate::config::Config;
use crate::error::{LogErr, Result};
use crate::models::{CurrentUser, Video};
use crate::services::naming;
use crate::services::upload::ImageUpload;
use crate::services::video::{VideoService, VideoStore};
use crate::storage::StorageProvider;

/// Multipart field carrying the thumbnail image
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Thumbnail service
pub struct ThumbnailService;

impl ThumbnailService {
    /// Store a validated image as the video's thumbnail and record its URL.
    ///
    /// Steps run in order and stop at the first failure: load the video, check
    /// ownership, name the asset, write it, then update the metadata.
    pub async fn attach(
        store: &dyn VideoStore,
        storage: &dyn StorageProvider,
        config: &Config,
        current_user: &CurrentUser,
        raw_video_id: &str,
        upload: ImageUpload,
    ) -> Result<Video> {
        let mut video = VideoService::load(store, raw_video_id).await?;
        VideoService::ensure_owner(&video, current_user)?;

        tracing::info!(
            video_id = %video.id,
            user_id = %current_user.id,
            media_type = %upload.media_type,
            size = upload.size,
            "Uploading thumbnail"
        );

        let asset_id = naming::generate_asset_id()?;
        let file_name = upload.file_name(&asset_id);

        let reader = upload
            .reader()
            .await
            .log_internal("Unable to save thumbnail")?;
        storage
            .put(&file_name, reader)
            .await
            .log_internal("Unable to save thumbnail")?;

        video.thumbnail_url = Some(config.asset_url(&file_name));
        video.updated_at = Utc::now().to_rfc3339();

        if let Err(e) = store.update_video(&video).await {
            if config.storage.remove_orphans {
                match storage.delete(&file_name).await {
                    Ok(()) => tracing::info!("Removed orphaned asset {}", file_name),
                    Err(cleanup_err) => tracing::error!(
                        "Failed to remove orphaned asset {}: {}",
                        file_name,
                        cleanup_err
                    ),
                }
            } else {
                tracing::warn!(
                    "Asset {} left without a referencing video ({} storage)",
                    file_name,
                    storage.storage_type()
                );
            }

            return Err(e).log_internal("Unable to update video");
        }

        tracing::info!("Thumbnail for video {} stored as {}", video.id, file_name);
        Ok(video)
    }
}
