pub mod cache;
pub mod calculate;
pub mod config;
pub mod domain;
pub mod git;
pub mod mainline;
pub mod merge_message;
pub mod output;
pub mod tagged;
pub mod variables;

pub mod error;

pub use error::{GitVerError, Result};
