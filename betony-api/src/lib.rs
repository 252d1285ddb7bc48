//! # Betony API Server Library
//!
//! HTTP transport for the Betony identity core.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and authentication layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
