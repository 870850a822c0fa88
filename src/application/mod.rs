//! Application services: the conversion pipeline and its error types.

pub mod error;
pub mod pipeline;
pub mod render;
