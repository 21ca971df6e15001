//! Optional screenshot attached to each decision request.
//!
//! Capturing the emulator window is left to the emulator (or any external
//! tool); this only picks up the most recent image from a known path.

use nesplay_providers::ImageContent;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct FrameSource {
    path: Option<PathBuf>,
}

impl FrameSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Latest frame, or None when disabled, missing or not an image
    pub async fn capture(&self) -> Option<ImageContent> {
        let path = self.path.as_ref()?;

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No frame at {:?}: {}", path, e);
                return None;
            }
        };

        match ImageContent::from_bytes(&bytes) {
            Some(image) => {
                debug!("Captured {} frame ({} bytes)", image.media_type, bytes.len());
                Some(image)
            }
            None => {
                warn!("Ignoring {:?}: not a PNG, JPEG, GIF or WebP image", path);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disabled_source() {
        let source = FrameSource::default();
        assert!(!source.is_enabled());
        assert!(source.capture().await.is_none());
    }

    #[tokio::test]
    async fn test_reads_png_and_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frame.png");
        let source = FrameSource::new(Some(path.clone()));

        assert!(source.capture().await.is_none());

        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(source.capture().await.is_none());

        let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0u8; 16]);
        std::fs::write(&path, &png).unwrap();

        let frame = source.capture().await.unwrap();
        assert_eq!(frame.media_type, "image/png");
    }
}
