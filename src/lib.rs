pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod files;
pub mod git;
pub mod release;
pub mod resolver;
pub mod ui;
pub mod warning;

pub use error::{Result, VandrError};
