//! Batch 68-point facial landmark detection for near-infrared frames.
//!
//! Frames are preprocessed, searched for a face with an escalating upsample
//! policy, and annotated with 68 landmarks. Frames where detection fails fall
//! back to the most recently completed successful result of the run.

pub mod detection;
pub mod frames;
pub mod pipeline;
pub mod preprocessing;
pub mod rendering;
pub mod shared;
