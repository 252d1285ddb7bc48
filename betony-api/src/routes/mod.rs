/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and account endpoints

pub mod auth;
pub mod health;
