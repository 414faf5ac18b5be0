use crate::core::landmarker::HandLandmarks;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// Reporting order of the fingertips within a hand.
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Index of this finger's tip in the 21-point hand landmark layout.
    pub fn tip_index(self) -> usize {
        match self {
            Finger::Thumb => 4,
            Finger::Index => 8,
            Finger::Middle => 12,
            Finger::Ring => 16,
            Finger::Pinky => 20,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index",
            Finger::Middle => "Middle",
            Finger::Ring => "Ring",
            Finger::Pinky => "Pinky",
        }
    }
}

/// A fingertip in pixel coordinates of the submitted image.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Fingertip {
    pub name: &'static str,
    pub x: f64,
    pub y: f64,
}

pub fn hand_fingertips(hand: &HandLandmarks, width: u32, height: u32) -> Vec<Fingertip> {
    Finger::ALL
        .iter()
        .map(|&finger| {
            let landmark = hand.landmark(finger.tip_index());
            Fingertip {
                name: finger.name(),
                x: f64::from(landmark.x) * f64::from(width),
                y: f64::from(landmark.y) * f64::from(height),
            }
        })
        .collect()
}

/// Denormalizes the fingertips of every hand, keeping detection order.
pub fn extract_fingertips(hands: &[HandLandmarks], width: u32, height: u32) -> Vec<Vec<Fingertip>> {
    hands
        .iter()
        .map(|hand| hand_fingertips(hand, width, height))
        .collect()
}

#[cfg(test)]
mod fingertips_tests {
    use crate::core::fingertips::{Finger, extract_fingertips, hand_fingertips};
    use crate::core::landmarker::{HandLandmarks, LANDMARKS_PER_HAND, NormalizedLandmark};

    fn hand_with_tips(tips: [(f32, f32); 5]) -> HandLandmarks {
        let mut points = vec![NormalizedLandmark::new(0.0, 0.0); LANDMARKS_PER_HAND];
        for (finger, (x, y)) in Finger::ALL.iter().zip(tips) {
            points[finger.tip_index()] = NormalizedLandmark::new(x, y);
        }
        HandLandmarks::new(points).unwrap()
    }

    #[test]
    pub fn test_names_and_order() {
        let hand = hand_with_tips([(0.1, 0.1); 5]);
        let names: Vec<&str> = hand_fingertips(&hand, 10, 10)
            .iter()
            .map(|tip| tip.name)
            .collect();
        assert_eq!(names, ["Thumb", "Index", "Middle", "Ring", "Pinky"]);
    }

    #[test]
    pub fn test_denormalization() {
        let hand = hand_with_tips([
            (0.25, 0.5),
            (0.1, 0.9),
            (1.0, 0.0),
            (0.0, 1.0),
            (0.333, 0.667),
        ]);
        let tips = hand_fingertips(&hand, 640, 480);

        let expected = [
            (160.0, 240.0),
            (64.0, 432.0),
            (640.0, 0.0),
            (0.0, 480.0),
            (0.333 * 640.0, 0.667 * 480.0),
        ];
        for (tip, (x, y)) in tips.iter().zip(expected) {
            assert!((tip.x - x).abs() < 1e-3, "{} x: {} != {}", tip.name, tip.x, x);
            assert!((tip.y - y).abs() < 1e-3, "{} y: {} != {}", tip.name, tip.y, y);
        }
    }

    #[test]
    pub fn test_only_tip_landmarks_are_used() {
        let mut points = vec![NormalizedLandmark::new(0.9, 0.9); LANDMARKS_PER_HAND];
        for finger in Finger::ALL {
            points[finger.tip_index()] = NormalizedLandmark::new(0.5, 0.5);
        }
        let hand = HandLandmarks::new(points).unwrap();

        for tip in hand_fingertips(&hand, 100, 200) {
            assert_eq!((tip.x, tip.y), (50.0, 100.0));
        }
    }

    #[test]
    pub fn test_hand_order_is_preserved() {
        let left = hand_with_tips([(0.1, 0.1); 5]);
        let right = hand_with_tips([(0.9, 0.9); 5]);
        let hands = extract_fingertips(&[right, left], 100, 100);

        assert_eq!(hands.len(), 2);
        assert!((hands[0][0].x - 90.0).abs() < 1e-3);
        assert!((hands[1][0].x - 10.0).abs() < 1e-3);
        assert!(extract_fingertips(&[], 100, 100).is_empty());
    }
}
