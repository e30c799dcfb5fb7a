//! # Web Handlers for the Campgrounds Web Application
//!
//! This crate provides the HTTP handlers and route table for campground listing,
//! detail, and authoring endpoints.

use actix_web::{Scope, web};

/// Campground listing, detail and authoring handlers
mod campground_handlers;
pub use campground_handlers::*;

/// Health check handlers
mod health_handlers;
pub use health_handlers::*;

/// Route table for `/campgrounds`.
///
/// Expects `web::Data<ListingService>` and `web::Data<MutationService>` in app data
/// and `AuthMiddleware` wrapped around the app so authoring routes can see the author.
pub fn campground_routes() -> Scope {
    web::scope("/campgrounds")
        .route("", web::get().to(list_campgrounds))
        .route("", web::post().to(create_campground))
        // Must precede "/{id}"
        .route("/map", web::get().to(map_campgrounds))
        .route("/{id}", web::get().to(show_campground))
        .route("/{id}", web::put().to(update_campground))
        .route("/{id}", web::delete().to(delete_campground))
        .route("/{id}/edit", web::get().to(edit_campground))
}
