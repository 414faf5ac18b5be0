pub mod config;
pub mod fingertips;
pub mod landmarker;
pub mod lifecycle;
pub mod model_store;
pub mod onnx_landmarker;
pub mod palm;
pub mod roi;
#[cfg(test)]
pub mod testing;
