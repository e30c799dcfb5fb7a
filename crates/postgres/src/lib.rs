//! # Postgres
//!
//! This crate provides the PostgreSQL backend for the campground services: connection
//! pooling, schema setup, and a [`campgrounds::CampgroundStore`] implementation.

/// Database connection and schema utilities.
pub mod database;

/// PostgreSQL implementation of the campground store.
pub mod campground_store;
pub use campground_store::PgCampgroundStore;
