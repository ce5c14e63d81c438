use anyhow::Context;
use image::DynamicImage;

/// One encoded image exactly as a client sent it. Never decoded until the detector takes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Vec<u8>);

impl Frame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decodes the frame, guessing the codec from its contents.
    pub fn decode(&self) -> anyhow::Result<DynamicImage> {
        if self.0.is_empty() {
            anyhow::bail!("cannot decode an empty frame");
        }
        image::load_from_memory(&self.0)
            .with_context(|| format!("failed to decode {} byte frame", self.0.len()))
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Frame {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat};
    use std::io::Cursor;

    #[test]
    fn decodes_png_frame() {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(12, 7)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let image = Frame::from(bytes).decode().unwrap();
        assert_eq!(image.dimensions(), (12, 7));
    }

    #[test]
    fn garbage_and_empty_frames_fail_to_decode() {
        assert!(Frame::from(b"not an image".as_slice()).decode().is_err());
        assert!(Frame::new(Vec::new()).decode().is_err());
    }
}
