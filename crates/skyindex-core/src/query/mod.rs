//! Query predicates over the catalog

pub mod filter;

pub use filter::AttributeFilter;
