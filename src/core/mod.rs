//! Core types shared across the viewer
//!
//! - `ViewerError` / `ViewerResult` - Error types

pub mod error;

pub use error::{ViewerError, ViewerResult};
