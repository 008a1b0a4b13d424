//! Skyindex Core Library
//!
//! Catalog search and personalized recommendation for astronomical objects.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod query;
pub mod recommend;
pub mod records;
pub mod similarity;
pub mod text;

pub use engine::{IndexStats, SkyIndex};
pub use error::{Result, SkyError};
