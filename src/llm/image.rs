//! Image payloads sent by the canvas.
//!
//! The canvas posts either raw base64 or a `data:<mime>;base64,<data>` URL.
//! Decoding happens once, at the request boundary, so a bad payload is a
//! client error rather than an upstream failure.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{AppError, Result};

const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn from_base64(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (mime_type, encoded) = match raw.strip_prefix("data:") {
            Some(url) => {
                let (header, data) = url
                    .split_once(',')
                    .ok_or_else(|| AppError::InvalidInput("Malformed image data URL".to_string()))?;
                let mime = header.strip_suffix(";base64").ok_or_else(|| {
                    AppError::InvalidInput("Image data URL must be base64 encoded".to_string())
                })?;
                let mime = if mime.is_empty() { DEFAULT_MIME_TYPE } else { mime };
                (mime, data)
            }
            None => (DEFAULT_MIME_TYPE, raw),
        };

        if !mime_type.starts_with("image/") {
            return Err(AppError::InvalidInput(format!("Unsupported image type: {}", mime_type)));
        }

        let compact: String = encoded.split_ascii_whitespace().collect();
        let data = STANDARD
            .decode(compact)
            .map_err(|e| AppError::InvalidInput(format!("Image is not valid base64: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::InvalidInput("Image payload is empty".to_string()));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }
}
