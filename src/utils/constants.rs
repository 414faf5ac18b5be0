pub const DEFAULT_SERVICE_PORT: u16 = 8000;
pub const DEFAULT_FRONTEND_PORT: u16 = 3000;

pub const LANDMARK_MODEL_FILE_NAME: &str = "hand_landmark_full.onnx";
pub const LANDMARK_MODEL_URL: &str =
    "https://github.com/SludgePhD/Zaru/raw/main/3rdparty/onnx/hand_landmark_full.onnx";

pub const PALM_MODEL_FILE_NAME: &str = "palm_detection_full.onnx";
pub const PALM_MODEL_URL: &str =
    "https://github.com/SludgePhD/Zaru/raw/main/3rdparty/onnx/palm_detection_full.onnx";

pub const DEFAULT_PALM_THRESHOLD: f32 = 0.5;
pub const DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_MAX_HANDS: usize = 2;

// 20 MiB
pub const SERVER_REQUEST_BODY_LIMIT: usize = 20 * 1024 * 1024;

pub const DEFAULT_LANDMARK_SERVICE_URL: &str = "http://localhost:8000";
