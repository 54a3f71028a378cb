//! Movie image sync library - shared modules for the binary and its tests.

pub mod config;
pub mod convert;
pub mod error;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod store;
pub mod sync;
