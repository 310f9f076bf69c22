pub mod annotation;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod finalize;
pub mod fs_util;
pub mod output;
pub mod overview;
pub mod pipeline;
pub mod store;
pub mod tables;
pub mod taxonomy;
