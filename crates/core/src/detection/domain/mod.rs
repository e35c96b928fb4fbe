pub mod capabilities;
pub mod detection_escalator;
pub mod detection_outcome;
pub mod escalation_policy;
pub mod face_detector;
pub mod landmark_predictor;
