pub mod annotate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod profile;
pub mod project;
pub mod render;
pub mod source;
pub mod tree;
