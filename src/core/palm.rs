//! Palm detection output decoding.
//!
//! The palm detector is a single-shot multibox detector. It scores 2016 anchors laid out on a
//! 24x24 and a 12x12 grid over its 192x192 input, and regresses a box plus 7 palm keypoints
//! relative to each anchor. Overlapping candidates are merged by non-maximum suppression, and each
//! surviving palm is turned into the rotated hand region the landmark network is run on.

use crate::core::roi::RotatedRect;
use anyhow::{Error, ensure};
use std::sync::LazyLock;

pub const PALM_INPUT_SIZE: usize = 192;
pub const PALM_VALUES_PER_ANCHOR: usize = 18;
pub const PALM_KEYPOINTS: usize = 7;

/// Detections overlapping a stronger one by at least this much are dropped.
pub const IOU_THRESHOLD: f32 = 0.3;

// palm box -> hand region
const HAND_SCALE: f32 = 2.6;
const HAND_SHIFT_Y: f32 = -0.5;

const WRIST: usize = 0;
const MIDDLE_FINGER_MCP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x_center: f32,
    pub y_center: f32,
}

struct AnchorLayer {
    boxes_per_cell: usize,
    cells: usize,
}

const ANCHOR_LAYERS: [AnchorLayer; 2] = [
    AnchorLayer {
        boxes_per_cell: 2,
        cells: 24,
    },
    AnchorLayer {
        boxes_per_cell: 6,
        cells: 12,
    },
];

static ANCHORS: LazyLock<Vec<Anchor>> = LazyLock::new(|| {
    let mut anchors = Vec::new();
    for layer in &ANCHOR_LAYERS {
        for y in 0..layer.cells {
            for x in 0..layer.cells {
                for _ in 0..layer.boxes_per_cell {
                    anchors.push(Anchor {
                        x_center: (x as f32 + 0.5) / layer.cells as f32,
                        y_center: (y as f32 + 0.5) / layer.cells as f32,
                    });
                }
            }
        }
    }
    anchors
});

pub fn anchors() -> &'static [Anchor] {
    &ANCHORS
}

/// A detected palm. Coordinates are pixels of whatever space the detection was decoded in.
#[derive(Debug, Clone, PartialEq)]
pub struct PalmDetection {
    pub confidence: f32,
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
    pub keypoints: [(f32, f32); PALM_KEYPOINTS],
}

impl PalmDetection {
    fn bounds(&self) -> (f32, f32, f32, f32) {
        (
            self.x_center - self.width / 2.0,
            self.y_center - self.height / 2.0,
            self.x_center + self.width / 2.0,
            self.y_center + self.height / 2.0,
        )
    }

    pub fn iou(&self, other: &PalmDetection) -> f32 {
        let (ax0, ay0, ax1, ay1) = self.bounds();
        let (bx0, by0, bx1, by1) = other.bounds();

        let overlap_w = (ax1.min(bx1) - ax0.max(bx0)).max(0.0);
        let overlap_h = (ay1.min(by1) - ay0.max(by0)).max(0.0);
        let intersection = overlap_w * overlap_h;
        let union = self.width * self.height + other.width * other.height - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    /// Maps a detection made on a `input_size` square crop of `region` into image pixels.
    pub fn to_image(&self, region: &RotatedRect, input_size: f32) -> PalmDetection {
        let map = |(x, y): (f32, f32)| region.to_image(x / input_size, y / input_size);
        let scale = region.size / input_size;
        let (x_center, y_center) = map((self.x_center, self.y_center));

        PalmDetection {
            confidence: self.confidence,
            x_center,
            y_center,
            width: self.width * scale,
            height: self.height * scale,
            keypoints: self.keypoints.map(map),
        }
    }

    /// Clockwise rotation that brings the hand upright (fingers pointing up).
    pub fn rotation(&self) -> f32 {
        let (wx, wy) = self.keypoints[WRIST];
        let (mx, my) = self.keypoints[MIDDLE_FINGER_MCP];
        (-(wx - mx)).atan2(wy - my)
    }

    /// The rotated square covering the whole hand, grown from the palm box toward the fingers.
    pub fn hand_region(&self) -> RotatedRect {
        let angle = self.rotation();
        let (sin, cos) = angle.sin_cos();
        let shift = HAND_SHIFT_Y * self.height;

        RotatedRect {
            x_center: self.x_center - sin * shift,
            y_center: self.y_center + cos * shift,
            size: self.width.max(self.height) * HAND_SCALE,
            angle,
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Decodes raw detector outputs (`[1, 2016, 18]` boxes, `[1, 2016, 1]` logits) into palms whose
/// confidence reaches `threshold`. Coordinates are in detector input pixels.
pub fn decode_palms(
    boxes: &[f32],
    scores: &[f32],
    threshold: f32,
) -> Result<Vec<PalmDetection>, Error> {
    let anchors = anchors();
    ensure!(
        scores.len() == anchors.len(),
        "palm detector produced {} scores, expected {}",
        scores.len(),
        anchors.len()
    );
    ensure!(
        boxes.len() == anchors.len() * PALM_VALUES_PER_ANCHOR,
        "palm detector produced {} box values, expected {}",
        boxes.len(),
        anchors.len() * PALM_VALUES_PER_ANCHOR
    );

    let input = PALM_INPUT_SIZE as f32;
    let mut palms = Vec::new();
    for ((anchor, &logit), params) in anchors
        .iter()
        .zip(scores)
        .zip(boxes.chunks_exact(PALM_VALUES_PER_ANCHOR))
    {
        let confidence = sigmoid(logit);
        if confidence < threshold {
            continue;
        }

        let ax = anchor.x_center * input;
        let ay = anchor.y_center * input;
        let mut keypoints = [(0.0, 0.0); PALM_KEYPOINTS];
        for (i, keypoint) in keypoints.iter_mut().enumerate() {
            *keypoint = (params[4 + 2 * i] + ax, params[5 + 2 * i] + ay);
        }

        palms.push(PalmDetection {
            confidence,
            x_center: params[0] + ax,
            y_center: params[1] + ay,
            width: params[2],
            height: params[3],
            keypoints,
        });
    }

    Ok(palms)
}

/// Keeps the most confident palm of every overlapping group, strongest first.
pub fn non_max_suppression(
    mut palms: Vec<PalmDetection>,
    iou_threshold: f32,
) -> Vec<PalmDetection> {
    palms.sort_by(|a, b| a.confidence.total_cmp(&b.confidence));

    let mut kept = Vec::new();
    while let Some(seed) = palms.pop() {
        palms.retain(|other| seed.iou(other) < iou_threshold);
        kept.push(seed);
    }
    kept
}
