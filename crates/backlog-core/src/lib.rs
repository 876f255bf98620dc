pub mod config;
pub mod error;
pub mod feature;
pub mod io;
pub mod manager;
pub mod migration;
pub mod paths;
pub mod render;
pub mod speckit;
pub mod store;
pub mod tracker;
pub mod types;

pub use error::{BacklogError, Result};
