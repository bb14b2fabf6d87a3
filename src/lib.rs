#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cli;
pub mod compression;
pub mod config;
pub mod error;
pub mod provider;
pub mod selector;
pub mod tool;

pub use compression::{CompressionEngine, CompressionResult, CompressionStyle};
pub use config::Config;
pub use error::{Error, Result};
