//! # Betony Shared Library
//!
//! Identity and persistence core of the Betony social-posting backend,
//! shared by the API server and its tests.
//!
//! ## Module Organization
//!
//! - `auth`: Credential hashing, access tokens, token transport helpers
//! - `config`: Immutable auth and hashing configuration
//! - `db`: Connection pool, migrations and the Unit of Work
//! - `identity`: Registration, login and current-account resolution
//! - `models`: Records and their stores

pub mod auth;
pub mod config;
pub mod db;
pub mod identity;
pub mod models;

/// Current version of the Betony shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
