//! Turning a student's image reference into bytes that can be embedded in a
//! workbook. Inline `data:` references are decoded in place; anything else is
//! fetched through an [`ImageSource`].

use crate::domain::ports::ImageSource;
use crate::utils::error::{DashboardError, Result};
use base64::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

pub fn is_data_url(reference: &str) -> bool {
    reference.starts_with("data:image")
}

pub fn decode_data_url(reference: &str) -> Result<EmbeddedImage> {
    let (header, payload) =
        reference
            .split_once(',')
            .ok_or_else(|| DashboardError::ProcessingError {
                message: "inline image reference has no payload".to_string(),
            })?;

    let kind = if header.contains("jpeg") || header.contains("jpg") {
        ImageKind::Jpeg
    } else {
        ImageKind::Png
    };
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(DashboardError::ProcessingError {
            message: "inline image reference is empty".to_string(),
        });
    }

    Ok(EmbeddedImage { kind, bytes })
}

fn remote_kind(url: &str) -> ImageKind {
    let lower = url.to_lowercase();
    if lower.contains(".jpg") || lower.contains(".jpeg") {
        ImageKind::Jpeg
    } else {
        ImageKind::Png
    }
}

/// Best effort: any failure is logged and yields `None`.
pub async fn resolve_image<I: ImageSource + ?Sized>(
    source: &I,
    reference: &str,
) -> Option<EmbeddedImage> {
    let result = if is_data_url(reference) {
        decode_data_url(reference)
    } else {
        source.fetch(reference).await.and_then(|bytes| {
            if bytes.is_empty() {
                Err(DashboardError::ProcessingError {
                    message: "empty image body".to_string(),
                })
            } else {
                Ok(EmbeddedImage {
                    kind: remote_kind(reference),
                    bytes,
                })
            }
        })
    };

    match result {
        Ok(image) => Some(image),
        Err(e) => {
            let shown: String = reference.chars().take(80).collect();
            tracing::warn!("Skipping image '{}': {}", shown, e);
            None
        }
    }
}
