pub mod directory_frame_catalog;
pub mod file_frame_reader;
pub mod npy;
pub mod npy_artifact_store;
