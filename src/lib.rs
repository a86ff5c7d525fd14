//! Audit AI Assistant (TUI Edition)
//!
//! Terminal client for an audit-knowledge workspace: document upload,
//! library browsing, retrieval-augmented chat, and audit-plan drafting
//! against a fixed backend HTTP contract.

pub mod api;
pub mod config;
pub mod core;
pub mod tui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
