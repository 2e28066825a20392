//! Multipart extraction and image validation

use axum::extract::Multipart;
use bytes::{Bytes, BytesMut};
use mime_guess::mime::Mime;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{AppError, LogErr, Result};
use crate::storage::BoxedReader;

/// Media types accepted for thumbnails
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Leading bytes kept for signature checks
const SNIFF_BYTES: usize = 8192;

/// Validated image part of a multipart submission
#[derive(Debug)]
pub struct ImageUpload {
    /// Normalized media type, e.g. `image/png`
    pub media_type: String,
    /// Second component of the media type, used as the file extension
    pub extension: String,
    pub size: u64,
    pub body: UploadBody,
}

/// Contents of an uploaded part
#[derive(Debug)]
pub enum UploadBody {
    Memory(Bytes),
    /// Part outgrew the in-memory bound
    Spooled(SpooledFile),
}

/// Temporary file holding a large part, removed on drop
#[derive(Debug)]
pub struct SpooledFile {
    path: PathBuf,
}

impl SpooledFile {
    async fn create() -> Result<(fs::File, Self)> {
        let path = std::env::temp_dir().join(format!("tubely_upload_{}", Uuid::new_v4()));
        let file = fs::File::create(&path)
            .await
            .log_internal("Unable to buffer upload")?;
        Ok((file, Self { path }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SpooledFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::error!("Failed to remove temp file {:?}: {}", self.path, e);
        }
    }
}

impl ImageUpload {
    /// Stored file name for a generated asset id
    pub fn file_name(&self, asset_id: &str) -> String {
        format!("{}.{}", asset_id, self.extension)
    }

    /// Stream over the part's full contents
    pub async fn reader(&self) -> std::io::Result<BoxedReader> {
        match &self.body {
            UploadBody::Memory(data) => Ok(Box::pin(Cursor::new(data.clone()))),
            UploadBody::Spooled(spooled) => Ok(Box::pin(fs::File::open(spooled.path()).await?)),
        }
    }
}

/// Upload validation service
pub struct UploadValidator;

impl UploadValidator {
    /// Pull the named file part out of the form and validate its declared type.
    ///
    /// Up to `max_bytes` of the part are held in memory. A larger part is
    /// spooled to a temporary file rather than rejected.
    pub async fn extract(
        multipart: &mut Multipart,
        field_name: &str,
        config: &UploadConfig,
    ) -> Result<ImageUpload> {
        while let Some(mut field) = multipart
            .next_field()
            .await
            .log_bad_request("Unable to parse form file")?
        {
            if field.name() != Some(field_name) {
                continue;
            }

            let (media_type, extension) = Self::parse_image_type(field.content_type())?;

            let mut head = BytesMut::new();
            let mut buffer = BytesMut::new();
            let mut spool: Option<(fs::File, SpooledFile)> = None;
            let mut size: u64 = 0;

            while let Some(chunk) = field
                .chunk()
                .await
                .log_bad_request("Unable to parse form file")?
            {
                size += chunk.len() as u64;
                if head.len() < SNIFF_BYTES {
                    let take = chunk.len().min(SNIFF_BYTES - head.len());
                    head.extend_from_slice(&chunk[..take]);
                }

                match spool.as_mut() {
                    Some((file, _)) => file
                        .write_all(&chunk)
                        .await
                        .log_internal("Unable to buffer upload")?,
                    None if buffer.len() + chunk.len() > config.max_bytes => {
                        let (mut file, spooled) = SpooledFile::create().await?;
                        file.write_all(&buffer)
                            .await
                            .log_internal("Unable to buffer upload")?;
                        file.write_all(&chunk)
                            .await
                            .log_internal("Unable to buffer upload")?;
                        tracing::debug!("Spooling upload to {:?}", spooled.path());
                        buffer.clear();
                        spool = Some((file, spooled));
                    }
                    None => buffer.extend_from_slice(&chunk),
                }
            }

            if config.verify_content {
                Self::verify_signature(&head, &media_type)?;
            }

            let body = match spool {
                Some((mut file, spooled)) => {
                    file.flush().await.log_internal("Unable to buffer upload")?;
                    UploadBody::Spooled(spooled)
                }
                None => UploadBody::Memory(buffer.freeze()),
            };

            tracing::debug!(
                field = field_name,
                media_type = %media_type,
                size,
                spooled = matches!(body, UploadBody::Spooled(_)),
                "Extracted image part"
            );

            return Ok(ImageUpload {
                media_type,
                extension,
                size,
                body,
            });
        }

        Err(AppError::BadRequest("Unable to parse form file".to_string()))
    }

    /// Parse the declared content type of a part and check it against the whitelist.
    /// Returns the media type and its extension.
    pub fn parse_image_type(declared: Option<&str>) -> Result<(String, String)> {
        let mime: Mime = declared
            .unwrap_or_default()
            .parse()
            .log_bad_request("Invalid Content-Type")?;

        let media_type = mime.essence_str().to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&media_type.as_str()) {
            tracing::warn!("Rejected upload with media type {}", media_type);
            return Err(AppError::BadRequest("Invalid file type".to_string()));
        }

        let extension = media_type
            .split('/')
            .nth(1)
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Invalid media type".to_string()))?;

        Ok((media_type, extension))
    }

    /// Compare the content's magic bytes with the declared media type
    pub fn verify_signature(data: &[u8], media_type: &str) -> Result<()> {
        match infer::get(data) {
            Some(kind) if kind.mime_type() == media_type => Ok(()),
            Some(kind) => {
                tracing::warn!(
                    declared = %media_type,
                    detected = %kind.mime_type(),
                    "Upload content does not match declared type"
                );
                Err(AppError::BadRequest(
                    "File content does not match its type".to_string(),
                ))
            }
            None => {
                tracing::warn!(
                    declared = %media_type,
                    size = data.len(),
                    "Upload content has no recognizable signature"
                );
                Err(AppError::BadRequest(
                    "File content does not match its type".to_string(),
                ))
            }
        }
    }
}
