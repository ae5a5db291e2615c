//! HTTP handlers for resource CRUD and router fallbacks.

pub mod entity;
pub mod fallback;
pub use entity::*;
