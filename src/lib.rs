pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod ranker;
pub mod resolver;
pub mod session;
pub mod suggestion;

pub use error::{CatalogError, Result};
