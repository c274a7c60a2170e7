//! lengua-loader — Data sources and catalog loading.
//!
//! Fetches the three quiz data files from local paths or HTTP, concurrently
//! and under a timeout, and ingests them into a [`lengua_core::repository::Catalog`].
//! A category that fails to load is reported and left empty.

pub mod catalog;
pub mod config;
pub mod file;
pub mod http;
pub mod mock;
pub mod source;

pub use catalog::{load_catalog, CategoryReport, LoadOutcome, Sources};
pub use config::{create_source, load_config, LenguaConfig, SourceConfig};
pub use source::ItemSource;
