//! # Catalogue API Server Library
//!
//! HTTP front of the technician catalogue: login, browsing, technical sheets,
//! name search and photo search.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response hardening
//! - `routes`: Route handlers
//! - `session`: Session cookie handling

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
