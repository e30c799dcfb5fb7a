//! # Auth Services
//!
//! This crate verifies the bearer tokens issued by the application's identity provider.
//! It includes JWT token handling and middleware that exposes the authenticated author
//! to request handlers.

/// JWT token handling and author identification.
pub mod jwt;
/// Middleware for request authentication.
pub mod middleware;
/// Types and structures used in authentication services.
pub mod types;
