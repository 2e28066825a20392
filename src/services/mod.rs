pub mod auth;
pub mod naming;
pub mod thumbnail;
pub mod upload;
pub mod video;

pub use auth::AuthService;
pub use thumbnail::ThumbnailService;
pub use upload::UploadValidator;
pub use video::{VideoService, VideoStore};
