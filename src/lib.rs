//! mdpress: GitHub-flavored Markdown to themed HTML or PDF.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
