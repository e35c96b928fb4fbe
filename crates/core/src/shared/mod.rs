pub mod constants;
pub mod frame;
pub mod frame_error;
pub mod landmarks;
pub mod region;
