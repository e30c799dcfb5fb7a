//! # Campgrounds
//!
//! This crate provides the listing and mutation services for campground records.
//! It turns listing requests into store queries, expands stored records into
//! display-ready views, and coordinates geocoding and image hosting on writes.

/// Types for campgrounds, reviews, authors and the requests that touch them
mod types;
pub use types::*;

/// Escaping of untrusted search text
mod sanitizer;
pub use sanitizer::*;

/// Translation of listing parameters into query descriptors
mod query_builder;
pub use query_builder::*;

/// Storage abstraction for campgrounds and their relations
mod store;
pub use store::*;

/// In-memory store used for development and tests
mod memory_store;
pub use memory_store::*;

/// Resolution of review and author references for display
mod expander;
pub use expander::*;

/// Read-side service for listings and detail views
mod listing_service;
pub use listing_service::*;

/// Write-side service for create, update and delete
mod mutation_service;
pub use mutation_service::*;

/// Forward geocoding clients
mod geocoder;
pub use geocoder::*;

/// Image host clients
mod image_host;
pub use image_host::*;

/// Explicit configuration for external service clients
mod config;
pub use config::*;

#[cfg(test)]
mod recording;
