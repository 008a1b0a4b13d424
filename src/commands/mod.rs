//! Command implementations for skyindex

pub mod dispatch;
pub mod export;
pub mod format;
pub mod load;
pub mod recommend;
pub mod search;
pub mod stats;
pub mod train;
