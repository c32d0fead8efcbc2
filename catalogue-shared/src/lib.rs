//! # Catalogue Shared Library
//!
//! Shared types, persistence and business logic for the technician-facing
//! catalogue service.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `models`: Technicians, sessions and the read-only component catalogue
//! - `auth`: Password hashing and session tokens
//! - `vision`: CLIP embeddings and image-to-component scoring

pub mod auth;
pub mod db;
pub mod models;
pub mod vision;

/// Current version of the catalogue shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
