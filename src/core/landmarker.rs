//! The detector contract.
//!
//! A [`HandLandmarker`] takes a decoded RGB frame and returns every hand it found, each as 21
//! landmarks normalized to the frame size. How the landmarks are produced is up to the backend.

use anyhow::{Error, ensure};
use image::RgbImage;

pub const LANDMARKS_PER_HAND: usize = 21;

/// A landmark position as a fraction of the image width (`x`) and height (`y`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

impl NormalizedLandmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The 21 landmarks of one detected hand, in the model's landmark order.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    landmarks: Vec<NormalizedLandmark>,
}

impl HandLandmarks {
    pub fn new(landmarks: Vec<NormalizedLandmark>) -> Result<Self, Error> {
        ensure!(
            landmarks.len() == LANDMARKS_PER_HAND,
            "a hand has {} landmarks, got {}",
            LANDMARKS_PER_HAND,
            landmarks.len()
        );
        Ok(Self { landmarks })
    }

    #[inline]
    pub fn landmark(&self, index: usize) -> NormalizedLandmark {
        self.landmarks[index]
    }
}

/// Single-image hand landmark detection.
///
/// Implementations are shared between concurrent requests, so `detect` must not rely on
/// per-call mutable state.
pub trait HandLandmarker: Send + Sync {
    /// Detects hands in `image`. Hands are returned in detection order; an empty list means no
    /// hand was found.
    fn detect(&self, image: &RgbImage) -> Result<Vec<HandLandmarks>, Error>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
