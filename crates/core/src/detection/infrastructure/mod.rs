pub mod model_capabilities;
pub mod model_resolver;
pub mod onnx_landmark_predictor;
pub mod onnx_session;
pub mod rustface_detector;
