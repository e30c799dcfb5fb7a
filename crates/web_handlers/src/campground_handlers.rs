use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use auth_services::middleware::AuthenticatedAuthor;
use campgrounds::*;

/// Lists campgrounds, optionally searched, sorted or filtered by tag
pub async fn list_campgrounds(
    listing_service: web::Data<ListingService>,
    query: web::Query<ListingParams>,
) -> Result<HttpResponse, CampgroundError> {
    let listing = listing_service.list_campgrounds(&query).await?;

    if listing.notice.is_some() {
        log::info!("🔍 No campgrounds matched search {:?}", query.search);
    }

    Ok(HttpResponse::Ok().json(listing))
}

/// Gets every campground for the cluster map
pub async fn map_campgrounds(
    listing_service: web::Data<ListingService>,
) -> Result<HttpResponse, CampgroundError> {
    let campgrounds = listing_service.map_campgrounds().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "campgrounds": campgrounds,
        "total": campgrounds.len()
    })))
}

/// Gets a campground with its author and reviews
pub async fn show_campground(
    listing_service: web::Data<ListingService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CampgroundError> {
    let campground = listing_service.show_detail(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(campground))
}

/// Gets a campground as stored, to pre-fill an edit form
pub async fn edit_campground(
    listing_service: web::Data<ListingService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CampgroundError> {
    let campground = listing_service.edit_form(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(campground))
}

/// Creates a campground owned by the authenticated author.
/// Returns a 201 Created response with the stored campground.
pub async fn create_campground(
    mutation_service: web::Data<MutationService>,
    author: AuthenticatedAuthor,
    request: web::Json<CreateCampgroundRequest>,
) -> Result<HttpResponse, CampgroundError> {
    let campground = mutation_service
        .create(&request.campground, &request.files, author.0)
        .await?;

    log::info!("🏕️ Author {} created campground {}", author.0, campground.id);

    Ok(HttpResponse::Created().json(CampgroundResponse {
        message: "Successfully made a new campground!".to_string(),
        campground,
        failed_image_deletions: Vec::new(),
    }))
}

/// Updates a campground's fields and images
pub async fn update_campground(
    mutation_service: web::Data<MutationService>,
    author: AuthenticatedAuthor,
    path: web::Path<Uuid>,
    request: web::Json<UpdateCampgroundRequest>,
) -> Result<HttpResponse, CampgroundError> {
    let id = path.into_inner();
    let updated = mutation_service
        .update(
            id,
            &request.campground,
            &request.files,
            &request.delete_images,
        )
        .await?;

    if !updated.failed_image_deletions.is_empty() {
        log::warn!(
            "⚠️ Author {} updated campground {} but {} image(s) could not be deleted",
            author.0,
            id,
            updated.failed_image_deletions.len()
        );
    }

    Ok(HttpResponse::Ok().json(CampgroundResponse {
        message: "Successfully updated campground!".to_string(),
        campground: updated.campground,
        failed_image_deletions: updated.failed_image_deletions,
    }))
}

/// Deletes a campground. Succeeds even if the campground does not exist.
pub async fn delete_campground(
    mutation_service: web::Data<MutationService>,
    author: AuthenticatedAuthor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CampgroundError> {
    let id = path.into_inner();
    mutation_service.delete(id).await?;

    log::info!("🗑️ Author {} deleted campground {}", author.0, id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully deleted campground!",
        "id": id
    })))
}
