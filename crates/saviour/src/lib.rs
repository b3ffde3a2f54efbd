//! `saviour` - A local blood donor registry
//!
//! This library keeps an ordered registry of blood donors in a string
//! key-value store, tops it up with demo donors, searches it, and projects it
//! into escaped HTML, map markers and chart data.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod auth;
pub mod chart;
pub mod cli;
pub mod config;
pub mod donor;
pub mod error;
pub mod explore;
pub mod generator;
pub mod logging;
pub mod map;
pub mod registry;
pub mod render;
pub mod sanitize;
pub mod storage;

pub use app::App;
pub use config::Config;
pub use donor::{BloodGroup, DonorRecord};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use registry::Registry;
pub use render::filter;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageStats};
