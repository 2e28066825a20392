//! Asset naming

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::error::{LogErr, Result};

/// Random bytes behind every asset name
pub const ASSET_ID_BYTES: usize = 32;

/// Generate a new asset id: 32 bytes from the OS entropy source,
/// encoded as unpadded URL-safe base64 (43 characters).
///
/// Uniqueness is not checked against existing assets.
pub fn generate_asset_id() -> Result<String> {
    let mut bytes = [0u8; ASSET_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .log_internal("Couldn't generate asset name")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
