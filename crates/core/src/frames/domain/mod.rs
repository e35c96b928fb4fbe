pub mod artifact_store;
pub mod frame_catalog;
pub mod frame_reader;
pub mod frame_source;
pub mod output_layout;
