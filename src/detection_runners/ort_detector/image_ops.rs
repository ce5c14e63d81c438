//! Letterbox preprocessing: aspect-preserving resize into a square, gray-padded
//! model input, normalized to `[0, 1]` in NCHW order.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::{CroppedImageMut, Image as FirImage},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::DynamicImage;
use ndarray::Array4;
use crate::common::BvrBox;

/// YOLO convention for the padding color.
pub const LETTERBOX_FILL: u8 = 114;

/// Maps boxes from letterboxed model space back onto the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub src_width: u32,
    pub src_height: u32,
}

impl LetterboxTransform {
    pub fn restore(&self, bbox: BvrBox) -> BvrBox {
        BvrBox::new(
            (bbox.x1 - self.pad_x) / self.scale,
            (bbox.y1 - self.pad_y) / self.scale,
            (bbox.x2 - self.pad_x) / self.scale,
            (bbox.y2 - self.pad_y) / self.scale,
        )
        .clamp_to(self.src_width as f32, self.src_height as f32)
    }
}

/// Letterboxes `image` into a `target` x `target` NCHW tensor.
pub fn letterbox(image: &DynamicImage, target: u32) -> Result<(Array4<f32>, LetterboxTransform)> {
    let rgb = image.to_rgb8();
    let (w0, h0) = rgb.dimensions();
    if w0 == 0 || h0 == 0 {
        bail!("cannot letterbox an empty {}x{} image", w0, h0);
    }
    if target == 0 {
        bail!("letterbox target size must be non-zero");
    }

    let scale = (target as f32 / w0 as f32).min(target as f32 / h0 as f32);
    let new_w = ((w0 as f32 * scale).round() as u32).clamp(1, target);
    let new_h = ((h0 as f32 * scale).round() as u32).clamp(1, target);
    let (left, top) = ((target - new_w) / 2, (target - new_h) / 2);

    let src = FirImage::from_vec_u8(w0, h0, rgb.into_raw(), PixelType::U8x3)?;
    let mut padded = FirImage::from_vec_u8(
        target,
        target,
        vec![LETTERBOX_FILL; target as usize * target as usize * 3],
        PixelType::U8x3,
    )?;

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut resizer = Resizer::new();
    let mut cropped = CroppedImageMut::new(&mut padded, left, top, new_w, new_h)?;
    resizer.resize(&src, &mut cropped, &options)?;

    let tensor = nchw_normalize(&padded)?;
    let transform = LetterboxTransform {
        scale,
        pad_x: left as f32,
        pad_y: top as f32,
        src_width: w0,
        src_height: h0,
    };
    Ok((tensor, transform))
}

fn nchw_normalize(img: &FirImage) -> Result<Array4<f32>> {
    let buf = img.buffer();
    let w = img.width() as usize;
    let h = img.height() as usize;

    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let hw = w * h;
    let mut out = vec![0.0f32; buf.len()];
    for i in 0..hw {
        out[i] = buf[3 * i] as f32 / 255.0;
        out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
        out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
    }

    Ok(Array4::from_shape_vec((1, 3, h, w), out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn wide_image_is_padded_vertically() {
        // scale = min(640/200, 640/100) = 3.2 -> 640x320, 160 rows of padding above and below
        let image = DynamicImage::new_rgb8(200, 100);
        let (tensor, transform) = letterbox(&image, 640).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert!((transform.scale - 3.2).abs() < 1e-4);
        assert_eq!(transform.pad_x, 0.);
        assert_eq!(transform.pad_y, 160.);
    }

    #[test]
    fn pixels_are_normalized_and_padding_is_gray() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([255, 255, 255])));
        let (tensor, transform) = letterbox(&image, 64).unwrap();
        let pad_y = transform.pad_y as usize;

        assert!((tensor[[0, 0, pad_y + 8, 32]] - 1.0).abs() < 0.01);
        assert!((tensor[[0, 2, 0, 0]] - LETTERBOX_FILL as f32 / 255.0).abs() < 0.01);
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(letterbox(&DynamicImage::new_rgb8(2, 2), 0).is_err());
    }

    #[test]
    fn restore_maps_model_space_back_to_source() {
        let transform = LetterboxTransform {
            scale: 2.0,
            pad_x: 0.,
            pad_y: 40.,
            src_width: 100,
            src_height: 60,
        };
        let restored = transform.restore(BvrBox::new(20., 60., 120., 140.));
        assert_eq!(restored.as_x1y1_x2y2(), [10., 10., 60., 50.]);

        let clamped = transform.restore(BvrBox::new(-10., 0., 400., 400.));
        assert_eq!(clamped.as_x1y1_x2y2(), [0., 0., 100., 60.]);
    }
}
