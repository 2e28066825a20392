//! Image payloads and multipart forms.

use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

/// PNG-signed payload of `len` bytes with a varying tail
pub fn png_bytes(len: usize) -> Vec<u8> {
    with_signature(&PNG_SIGNATURE, len)
}

/// JPEG-signed payload of `len` bytes with a varying tail
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    with_signature(&JPEG_SIGNATURE, len)
}

fn with_signature(signature: &[u8], len: usize) -> Vec<u8> {
    let mut data = signature.to_vec();
    data.extend((0..len.saturating_sub(signature.len())).map(|i| (i % 251) as u8));
    data
}

/// Form with one file part named `field`
pub fn image_form(field: &str, data: Vec<u8>, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(Bytes::from(data))
        .file_name("thumbnail.bin")
        .mime_type(mime_type);
    MultipartForm::new().add_part(field.to_string(), part)
}

/// Form with a `thumbnail` file part
pub fn thumbnail_form(data: Vec<u8>, mime_type: &str) -> MultipartForm {
    image_form("thumbnail", data, mime_type)
}
