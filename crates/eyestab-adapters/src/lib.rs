//! Eyestab Adapters - External adapters for eyestab.
//!
//! This crate provides adapters for:
//! - Filesystem frame source and frame writer
//! - Landmark replay from JSON files

pub mod fs;
pub mod landmarks;

pub use fs::{FsFrameSource, FsFrameWriter};
pub use landmarks::JsonLandmarkDetector;
