//! Naskh Core Library
//!
//! Shared types, configuration and error taxonomy for the naskh storage
//! mirroring service.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::MirrorConfig;
pub use error::{Error, Result};

/// Naskh version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default destination filesystem mirrored objects land in
pub const DEFAULT_BACKUP_FILESYSTEM: &str = "backup";

/// Default webhook listen port
pub const DEFAULT_PORT: u16 = 7071;
