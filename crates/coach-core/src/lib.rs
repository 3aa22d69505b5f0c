//! # Coach-Core
//!
//! Core types for real-time exercise analysis from 2D pose keypoints:
//! the keypoint data model, the geometry kernel and the bounded frame
//! history shared by every stateful computation.

pub mod error;
pub mod geometry;
pub mod history;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use history::*;
pub use types::*;
