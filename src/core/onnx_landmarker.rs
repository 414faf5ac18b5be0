//! Hand landmark detection backed by two ONNX networks executed with `tract`.
//!
//! Both networks are MediaPipe's full-range hand models converted to ONNX and take RGB frames in
//! NCHW layout with values in `[0, 1]`.
//!
//! The palm detector sees the whole frame, padded to a square and scaled to 192x192. Every palm it
//! finds is grown into a rotated hand region, which is cropped to 224x224 and handed to the
//! landmark network. That network produces:
//!
//! 0. `[1, 63]` screen landmarks, `(x, y, z)` per landmark, in crop pixel space
//! 1. `[1, 1]` hand presence score
//! 2. `[1, 1]` handedness score
//!
//! Hands are reported in palm detector order, most confident first.

use crate::core::config::ModelConfig;
use crate::core::landmarker::{
    HandLandmarker, HandLandmarks, LANDMARKS_PER_HAND, NormalizedLandmark,
};
use crate::core::palm::{
    IOU_THRESHOLD, PALM_INPUT_SIZE, PalmDetection, decode_palms, non_max_suppression,
};
use crate::core::roi::{Letterbox, RotatedRect};
use anyhow::{Context, Error, ensure};
use image::RgbImage;
use std::path::Path;
use tract_onnx::prelude::*;

pub const LANDMARK_INPUT_SIZE: usize = 224;

type Plan = TypedRunnableModel<TypedModel>;

pub struct OnnxHandLandmarker {
    palm_detector: Plan,
    landmarker: Plan,
    palm_threshold: f32,
    presence_threshold: f32,
    max_hands: usize,
}

fn load_plan(path: &Path, input_size: usize) -> Result<Plan, Error> {
    match path.extension() {
        Some(ext) if ext == "onnx" => {}
        _ => anyhow::bail!("model file must have `.onnx` extension: {}", path.display()),
    }

    let plan = tract_onnx::onnx()
        .model_for_path(path)
        .with_context(|| format!("failed to read model {}", path.display()))?
        .with_input_fact(
            0,
            InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, input_size, input_size)),
        )?
        .into_optimized()?
        .into_runnable()?;
    Ok(plan)
}

impl OnnxHandLandmarker {
    pub fn load(config: &ModelConfig) -> Result<Self, Error> {
        let palm_detector = load_plan(&config.palm.path, PALM_INPUT_SIZE)?;
        let landmarker = load_plan(&config.landmark.path, LANDMARK_INPUT_SIZE)?;

        Ok(Self {
            palm_detector,
            landmarker,
            palm_threshold: config.palm_threshold,
            presence_threshold: config.presence_threshold,
            max_hands: config.max_hands,
        })
    }

    /// Palms in image pixel coordinates, strongest first.
    fn detect_palms(&self, image: &RgbImage) -> Result<Vec<PalmDetection>, Error> {
        let letterbox = Letterbox::new(image.width(), image.height());
        let input = image_tensor(&letterbox.apply(image, PALM_INPUT_SIZE as u32))?;
        let outputs = self.palm_detector.run(tvec!(input.into()))?;
        ensure!(
            outputs.len() >= 2,
            "palm detection network produced {} outputs, expected at least 2",
            outputs.len()
        );

        let palms = decode_palms(
            outputs[0].as_slice::<f32>()?,
            outputs[1].as_slice::<f32>()?,
            self.palm_threshold,
        )?;
        let mut palms = non_max_suppression(palms, IOU_THRESHOLD);
        palms.truncate(self.max_hands);

        let region = letterbox.region();
        Ok(palms
            .iter()
            .map(|palm| palm.to_image(&region, PALM_INPUT_SIZE as f32))
            .collect())
    }

    fn landmark_region(
        &self,
        image: &RgbImage,
        region: &RotatedRect,
    ) -> Result<Option<HandLandmarks>, Error> {
        let crop = region.crop(image, LANDMARK_INPUT_SIZE as u32);
        let outputs = self.landmarker.run(tvec!(image_tensor(&crop)?.into()))?;
        let outputs = outputs
            .iter()
            .map(|output| output.as_slice::<f32>())
            .collect::<Result<Vec<&[f32]>, Error>>()?;

        match landmarks_from_outputs(&outputs, self.presence_threshold)? {
            Some(points) => Ok(Some(hand_in_frame(
                &points,
                region,
                image.width(),
                image.height(),
            )?)),
            None => Ok(None),
        }
    }
}

impl HandLandmarker for OnnxHandLandmarker {
    fn detect(&self, image: &RgbImage) -> Result<Vec<HandLandmarks>, Error> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }

        let palms = self.detect_palms(image)?;
        tracing::debug!(palms = palms.len(), "palm detection finished");

        let mut hands = Vec::with_capacity(palms.len());
        for palm in &palms {
            if let Some(hand) = self.landmark_region(image, &palm.hand_region())? {
                hands.push(hand);
            }
        }
        Ok(hands)
    }

    fn name(&self) -> &str {
        "onnx-palm-hand-landmark"
    }
}

/// Lays `image` out as a `[1, 3, H, W]` tensor with values in `[0, 1]`.
fn image_tensor(image: &RgbImage) -> Result<Tensor, Error> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let plane = width * height;
    let mut data = vec![0.0f32; 3 * plane];
    for (i, pixel) in image.pixels().enumerate() {
        for channel in 0..3 {
            data[channel * plane + i] = f32::from(pixel[channel]) / 255.0;
        }
    }

    Ok(Tensor::from_shape(&[1, 3, height, width], &data)?)
}

/// Interprets the landmark network's outputs. Returns the 21 `(x, y)` points in crop pixel space,
/// or `None` when the presence score is below `presence_threshold`.
pub fn landmarks_from_outputs(
    outputs: &[&[f32]],
    presence_threshold: f32,
) -> Result<Option<Vec<(f32, f32)>>, Error> {
    ensure!(
        outputs.len() >= 2,
        "hand landmark network produced {} outputs, expected at least 2",
        outputs.len()
    );

    let presence = outputs[1]
        .first()
        .copied()
        .context("hand landmark network produced an empty presence output")?;
    tracing::debug!(presence, "hand landmark inference finished");
    if presence < presence_threshold {
        return Ok(None);
    }

    let screen = outputs[0];
    ensure!(
        screen.len() == LANDMARKS_PER_HAND * 3,
        "expected {} landmark values, got {}",
        LANDMARKS_PER_HAND * 3,
        screen.len()
    );
    Ok(Some(screen.chunks_exact(3).map(|xyz| (xyz[0], xyz[1])).collect()))
}

/// Maps crop pixel points back through `region` into fractions of the frame size.
fn hand_in_frame(
    points: &[(f32, f32)],
    region: &RotatedRect,
    width: u32,
    height: u32,
) -> Result<HandLandmarks, Error> {
    let size = LANDMARK_INPUT_SIZE as f32;
    let landmarks = points
        .iter()
        .map(|&(x, y)| {
            let (fx, fy) = region.to_image(x / size, y / size);
            NormalizedLandmark::new(fx / width as f32, fy / height as f32)
        })
        .collect();
    HandLandmarks::new(landmarks)
}

#[cfg(test)]
mod onnx_landmarker_tests {
    use crate::core::config::{ArtifactConfig, ModelConfig};
    use crate::core::onnx_landmarker::{
        LANDMARK_INPUT_SIZE, OnnxHandLandmarker, hand_in_frame, image_tensor,
        landmarks_from_outputs,
    };
    use crate::core::roi::{Letterbox, RotatedRect};
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;
    use url::Url;

    fn screen_with_thumb(x: f32, y: f32) -> Vec<f32> {
        let mut screen = vec![0.0f32; 63];
        screen[4 * 3] = x;
        screen[4 * 3 + 1] = y;
        screen[4 * 3 + 2] = -3.0;
        screen
    }

    fn artifact(name: &str) -> ArtifactConfig {
        ArtifactConfig {
            path: PathBuf::from(name),
            url: Url::parse("http://127.0.0.1:1/model").unwrap(),
            sha3_256: None,
        }
    }

    #[test]
    pub fn test_image_tensor_layout() {
        let image = RgbImage::from_pixel(8, 4, Rgb([255, 0, 51]));
        let tensor = image_tensor(&image).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 4, 8]);
        let data = tensor.as_slice::<f32>().unwrap();
        let plane = 32;
        assert!(data[..plane].iter().all(|v| (*v - 1.0).abs() < 1e-6));
        assert!(data[plane..2 * plane].iter().all(|v| v.abs() < 1e-6));
        assert!(data[2 * plane..].iter().all(|v| (*v - 0.2).abs() < 1e-6));
    }

    #[test]
    pub fn test_presence_at_threshold_reports_hand() {
        let screen = screen_with_thumb(112.0, 56.0);
        let screen = screen.as_slice();
        let points = landmarks_from_outputs(&[screen, &[0.5], &[0.9]], 0.5)
            .unwrap()
            .unwrap();

        assert_eq!(points.len(), 21);
        assert_eq!(points[4], (112.0, 56.0));
    }

    #[test]
    pub fn test_presence_around_threshold() {
        let screen = screen_with_thumb(112.0, 56.0);
        let screen = screen.as_slice();
        let below = 0.499_999_f32;
        let above = 0.500_001_f32;

        assert!(landmarks_from_outputs(&[screen, &[below]], 0.5).unwrap().is_none());
        assert!(landmarks_from_outputs(&[screen, &[above]], 0.5).unwrap().is_some());
    }

    #[test]
    pub fn test_malformed_outputs_are_errors() {
        let screen = screen_with_thumb(1.0, 1.0);
        let screen = screen.as_slice();

        assert!(landmarks_from_outputs(&[screen], 0.5).is_err());
        assert!(landmarks_from_outputs(&[], 0.5).is_err());
        let empty: &[f32] = &[];
        assert!(landmarks_from_outputs(&[screen, empty], 0.5).is_err());
        assert!(landmarks_from_outputs(&[&screen[..60], &[0.9]], 0.5).is_err());
    }

    #[test]
    pub fn test_absent_hand_skips_landmark_checks() {
        let empty: &[f32] = &[];
        assert!(landmarks_from_outputs(&[empty, &[0.1]], 0.5).unwrap().is_none());
    }

    #[test]
    pub fn test_letterboxed_points_map_to_frame_fractions() {
        // a 1280x720 frame padded to 1280x1280, landmarks reported in that square
        let region = Letterbox::new(1280, 720).region();
        let size = LANDMARK_INPUT_SIZE as f32;
        let mut points = vec![(0.0, 0.0); 21];
        points[4] = (size / 2.0, size / 2.0);
        // top edge of the real frame sits 280 px below the top of the square
        points[8] = (0.0, 280.0 / 1280.0 * size);

        let hand = hand_in_frame(&points, &region, 1280, 720).unwrap();
        let thumb = hand.landmark(4);
        assert!((thumb.x - 0.5).abs() < 1e-5);
        assert!((thumb.y - 0.5).abs() < 1e-5);
        let index = hand.landmark(8);
        assert!(index.x.abs() < 1e-5);
        assert!(index.y.abs() < 1e-5);
    }

    #[test]
    pub fn test_rotated_region_points_map_to_frame_fractions() {
        let region = RotatedRect {
            x_center: 100.0,
            y_center: 50.0,
            size: 40.0,
            angle: std::f32::consts::FRAC_PI_2,
        };
        let size = LANDMARK_INPUT_SIZE as f32;
        let mut points = vec![(size / 2.0, size / 2.0); 21];
        // bottom-center of the crop lands left of the center after a quarter turn
        points[0] = (size / 2.0, size);

        let hand = hand_in_frame(&points, &region, 200, 100).unwrap();
        assert!((hand.landmark(4).x - 0.5).abs() < 1e-5);
        assert!((hand.landmark(0).x - 80.0 / 200.0).abs() < 1e-5);
        assert!((hand.landmark(0).y - 0.5).abs() < 1e-5);
    }

    #[test]
    pub fn test_load_rejects_non_onnx_files() {
        let config = ModelConfig {
            palm: artifact("palm_detection.task"),
            landmark: artifact("hand_landmarker.task"),
            palm_threshold: 0.5,
            presence_threshold: 0.5,
            max_hands: 2,
        };
        let err = OnnxHandLandmarker::load(&config).err().unwrap();
        assert!(err.to_string().contains(".onnx"));
    }
}
