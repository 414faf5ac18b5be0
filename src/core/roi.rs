//! Square, possibly rotated regions of an image and the crops taken from them.
//!
//! Both networks want square inputs. Frames are padded to a square with black bars before they
//! are scaled, and hand crops are sampled from a rotated square, so no network ever sees a
//! stretched image. Points the networks report are mapped back through the same region.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// A square region of an image, rotated by `angle` radians around its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub x_center: f32,
    pub y_center: f32,
    pub size: f32,
    pub angle: f32,
}

impl RotatedRect {
    /// Maps `(u, v)` in `[0, 1]` crop space to image pixel coordinates.
    pub fn to_image(&self, u: f32, v: f32) -> (f32, f32) {
        let local_x = (u - 0.5) * self.size;
        let local_y = (v - 0.5) * self.size;
        let (sin, cos) = self.angle.sin_cos();
        (
            self.x_center + cos * local_x - sin * local_y,
            self.y_center + sin * local_x + cos * local_y,
        )
    }

    /// Samples the region into a `side`x`side` image. Pixels outside `image` are black.
    pub fn crop(&self, image: &RgbImage, side: u32) -> RgbImage {
        RgbImage::from_fn(side, side, |px, py| {
            let (x, y) = self.to_image(
                (px as f32 + 0.5) / side as f32,
                (py as f32 + 0.5) / side as f32,
            );
            sample_bilinear(image, x - 0.5, y - 0.5)
        })
    }
}

/// Black bars that pad a `width`x`height` frame to a centered square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Letterbox {
    pub side: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Letterbox {
    pub fn new(width: u32, height: u32) -> Self {
        let side = width.max(height);
        Self {
            side,
            offset_x: (side - width) / 2,
            offset_y: (side - height) / 2,
        }
    }

    /// The padded square in the original frame's coordinates.
    pub fn region(&self) -> RotatedRect {
        let half = self.side as f32 / 2.0;
        RotatedRect {
            x_center: half - self.offset_x as f32,
            y_center: half - self.offset_y as f32,
            size: self.side as f32,
            angle: 0.0,
        }
    }

    /// Pads `image` and scales the square to `side`x`side`.
    pub fn apply(&self, image: &RgbImage, side: u32) -> RgbImage {
        let mut canvas = RgbImage::new(self.side, self.side);
        imageops::replace(
            &mut canvas,
            image,
            i64::from(self.offset_x),
            i64::from(self.offset_y),
        );
        imageops::resize(&canvas, side, side, FilterType::Triangle)
    }
}

fn sample_bilinear(image: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let pixel = |xi: f32, yi: f32| -> [f32; 3] {
        if xi < 0.0 || yi < 0.0 || xi >= image.width() as f32 || yi >= image.height() as f32 {
            return [0.0; 3];
        }
        let p = image.get_pixel(xi as u32, yi as u32);
        [f32::from(p[0]), f32::from(p[1]), f32::from(p[2])]
    };

    let a = pixel(x0, y0);
    let b = pixel(x0 + 1.0, y0);
    let c = pixel(x0, y0 + 1.0);
    let d = pixel(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 3];
    for channel in 0..3 {
        let top = a[channel] + (b[channel] - a[channel]) * fx;
        let bottom = c[channel] + (d[channel] - c[channel]) * fx;
        out[channel] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}
