//! Fixed detectors for exercising the service without a model.

use crate::core::fingertips::Finger;
use crate::core::landmarker::{
    HandLandmarker, HandLandmarks, LANDMARKS_PER_HAND, NormalizedLandmark,
};
use anyhow::{Error, anyhow};
use image::RgbImage;

/// Always reports the same hands.
pub struct StubLandmarker {
    pub hands: Vec<HandLandmarks>,
}

impl HandLandmarker for StubLandmarker {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<HandLandmarks>, Error> {
        Ok(self.hands.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Fails every detection with `message`.
pub struct FailingLandmarker {
    pub message: &'static str,
}

impl HandLandmarker for FailingLandmarker {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<HandLandmarks>, Error> {
        Err(anyhow!(self.message))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Panics inside `detect`, like a backend hitting a bug in native code.
pub struct PanickingLandmarker;

impl HandLandmarker for PanickingLandmarker {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<HandLandmarks>, Error> {
        panic!("landmark backend crashed")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// A hand whose non-tip landmarks sit at `filler` and whose tips sit at `tips`.
pub fn hand(tips: [(f32, f32); 5], filler: (f32, f32)) -> HandLandmarks {
    let mut points = vec![NormalizedLandmark::new(filler.0, filler.1); LANDMARKS_PER_HAND];
    for (finger, (x, y)) in Finger::ALL.iter().zip(tips) {
        points[finger.tip_index()] = NormalizedLandmark::new(x, y);
    }
    HandLandmarks::new(points).unwrap()
}
