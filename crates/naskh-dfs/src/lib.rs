//! Naskh DFS client
//!
//! Connection-string parsing, Shared Key request signing and a REST client
//! for hierarchical storage accounts, plus the `MirrorStore` trait the
//! dispatcher drives.

pub mod client;
pub mod connection;
pub mod sign;
pub mod store;

pub use client::{ClientConfig, DataLakeClient};
pub use connection::ConnectionString;
pub use sign::SharedKeySigner;
pub use store::{BackupStore, MirrorStore};
