use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Message surfaced when a text search matches no campground
pub const NO_RESULTS_MESSAGE: &str = "No campgrounds found, please try again.";

/// GeoJSON geometry attached to a campground
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Geometry {
    /// Geometry type, `Point` for everything the geocoder returns
    #[serde(rename = "type")]
    pub kind: String,
    /// Coordinates as `[longitude, latitude]`
    pub coordinates: Vec<f64>,
}

impl Geometry {
    /// Builds a point geometry from a longitude/latitude pair
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![longitude, latitude],
        }
    }
}

/// Image stored with an external image host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRef {
    /// Public location of the hosted image
    pub url: String,
    /// Host-side identifier, unique within one campground
    pub filename: String,
}

/// File already staged with the image host by the upload layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedFile {
    /// Storage path reported by the upload layer
    pub path: String,
    /// Host-side identifier of the upload
    pub filename: String,
}

impl UploadedFile {
    /// Converts the staged upload into the reference stored on a campground
    pub fn to_image_ref(&self) -> ImageRef {
        ImageRef {
            url: self.path.clone(),
            filename: self.filename.clone(),
        }
    }
}

/// Campground record as persisted by the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campground {
    /// Unique identifier for the campground
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Free-text location, as entered by the author
    pub location: String,
    /// Coordinates resolved from the location at creation time
    pub geometry: Geometry,
    /// Nightly price
    pub price: f64,
    /// Aggregate rating
    pub rating: f64,
    /// Category label
    pub tag: Option<String>,
    /// Hosted images, in display order
    pub images: Vec<ImageRef>,
    /// Author who created the campground
    pub author_id: Uuid,
    /// Reviews left on the campground, oldest first
    pub review_ids: Vec<Uuid>,
    /// When the campground was created
    pub created_at: DateTime<Utc>,
    /// When the campground was last updated
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a new campground
#[derive(Debug, Clone, PartialEq)]
pub struct NewCampground {
    /// Display title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Free-text location
    pub location: String,
    /// Geocoded coordinates
    pub geometry: Geometry,
    /// Nightly price
    pub price: f64,
    /// Initial rating
    pub rating: f64,
    /// Category label
    pub tag: Option<String>,
    /// Initial images
    pub images: Vec<ImageRef>,
    /// Creating author
    pub author_id: Uuid,
}

/// Review left on a campground
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Author of the review
    pub author_id: Uuid,
    /// Review text
    pub body: String,
    /// Star rating given by the reviewer
    pub rating: i32,
}

/// User that authors campgrounds and reviews
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    /// Unique identifier for the author
    pub id: Uuid,
    /// Public display name
    pub username: String,
    /// Contact email
    pub email: String,
}

/// Author reference resolved for display
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthorRef {
    /// The referenced author exists
    Resolved(Author),
    /// The reference points at an author that no longer exists
    Missing {
        /// Identifier stored on the referencing record
        id: Uuid,
    },
}

impl AuthorRef {
    /// Identifier of the referenced author, resolved or not
    pub fn id(&self) -> Uuid {
        match self {
            AuthorRef::Resolved(author) => author.id,
            AuthorRef::Missing { id } => *id,
        }
    }

    /// The author, if the reference resolved
    pub fn resolved(&self) -> Option<&Author> {
        match self {
            AuthorRef::Resolved(author) => Some(author),
            AuthorRef::Missing { .. } => None,
        }
    }
}

/// Review with its author resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewView {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Review text
    pub body: String,
    /// Star rating given by the reviewer
    pub rating: i32,
    /// Review author
    pub author: AuthorRef,
}

/// Campground with its author, reviews and review authors resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampgroundView {
    /// Unique identifier for the campground
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Free-text location
    pub location: String,
    /// Geocoded coordinates
    pub geometry: Geometry,
    /// Nightly price
    pub price: f64,
    /// Aggregate rating
    pub rating: f64,
    /// Category label
    pub tag: Option<String>,
    /// Hosted images, in display order
    pub images: Vec<ImageRef>,
    /// Campground author
    pub author: AuthorRef,
    /// Reviews in the order they were left
    pub reviews: Vec<ReviewView>,
    /// When the campground was created
    pub created_at: DateTime<Utc>,
    /// When the campground was last updated
    pub updated_at: DateTime<Utc>,
}

/// Query string parameters of a listing request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    /// Free-text search over title and location
    pub search: Option<String>,
    /// Sort mode, or a tag label to filter by
    #[serde(rename = "sortby", alias = "sortBy")]
    pub sort_by: Option<String>,
}

impl ListingParams {
    /// Parameters for a free-text search
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            sort_by: None,
        }
    }

    /// Parameters for a sort mode or tag filter
    pub fn sort_by(value: impl Into<String>) -> Self {
        Self {
            search: None,
            sort_by: Some(value.into()),
        }
    }
}

/// Signal that a text search matched nothing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NoResultsNotice {
    /// Message for the caller to surface
    pub message: String,
}

impl Default for NoResultsNotice {
    fn default() -> Self {
        Self {
            message: NO_RESULTS_MESSAGE.to_string(),
        }
    }
}

/// Result of a listing request
#[derive(Debug, Serialize)]
pub struct CampgroundListing {
    /// Matching campgrounds, fully expanded
    pub campgrounds: Vec<CampgroundView>,
    /// Present only when a text search found nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<NoResultsNotice>,
}

/// Request structure for creating a campground
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CampgroundInput {
    /// Display title
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Free-text location to geocode
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    /// Nightly price
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    /// Category label
    pub tag: Option<String>,
}

impl CampgroundInput {
    /// Copy with surrounding whitespace trimmed from title and location
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            location: self.location.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Field-level changes to an existing campground
///
/// Author and geometry are deliberately absent: both are fixed at creation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CampgroundPatch {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New location text; coordinates are kept as geocoded at creation
    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: Option<String>,

    /// New nightly price
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,

    /// New category label
    pub tag: Option<String>,
}

impl CampgroundPatch {
    /// Copy with surrounding whitespace trimmed from title and location
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.as_deref().map(|t| t.trim().to_string()),
            location: self.location.as_deref().map(|l| l.trim().to_string()),
            ..self.clone()
        }
    }

    /// Whether the patch changes no field
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.price.is_none()
            && self.tag.is_none()
    }
}

/// Request body for creating a campground
#[derive(Debug, Deserialize)]
pub struct CreateCampgroundRequest {
    /// Campground fields
    pub campground: CampgroundInput,
    /// Images staged by the upload layer
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

/// Request body for updating a campground
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCampgroundRequest {
    /// Fields to change
    #[serde(default)]
    pub campground: CampgroundPatch,
    /// Images staged by the upload layer, appended to the existing list
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    /// Filenames of images to remove from the host and the campground
    #[serde(default, rename = "deleteImages", alias = "delete_images")]
    pub delete_images: Vec<String>,
}

/// Outcome of an update
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdatedCampground {
    /// Campground as stored after the update
    pub campground: Campground,
    /// Filenames the image host failed to delete; they stay on the campground
    pub failed_image_deletions: Vec<String>,
}

/// Response structure for create and update requests
#[derive(Debug, Serialize)]
pub struct CampgroundResponse {
    /// Human-readable outcome
    pub message: String,
    /// Campground as stored
    pub campground: Campground,
    /// Filenames the image host failed to delete
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_image_deletions: Vec<String>,
}

/// Custom error type for campground operations
#[derive(thiserror::Error, Debug)]
pub enum CampgroundError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// No campground with the requested id
    #[error("Campground {0} not found")]
    NotFound(Uuid),

    /// The geocoder returned no candidate for a location
    #[error("Could not geocode location: {0}")]
    GeocodingFailure(String),

    /// Geocoder or image host failed
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl actix_web::ResponseError for CampgroundError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            CampgroundError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            CampgroundError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "campground_not_found",
                "message": "No campground found!"
            })),
            CampgroundError::GeocodingFailure(location) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": "geocoding_failure",
                    "message": format!("Could not find coordinates for '{}'", location)
                }))
            }
            CampgroundError::ExternalService(msg) => {
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": "external_service_error",
                    "message": format!("External service error: {}", msg)
                }))
            }
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_params_accept_both_sort_spellings() {
        let lower: ListingParams = serde_json::from_str(r#"{"sortby": "lowestPrice"}"#).unwrap();
        let camel: ListingParams = serde_json::from_str(r#"{"sortBy": "lowestPrice"}"#).unwrap();

        assert_eq!(lower.sort_by.as_deref(), Some("lowestPrice"));
        assert_eq!(camel.sort_by.as_deref(), Some("lowestPrice"));
        assert!(lower.search.is_none());
    }

    #[test]
    fn test_author_ref_serializes_with_status() {
        let id = Uuid::new_v4();
        let missing = serde_json::to_value(AuthorRef::Missing { id }).unwrap();
        assert_eq!(missing["status"], "missing");
        assert_eq!(missing["id"], id.to_string());

        let resolved = serde_json::to_value(AuthorRef::Resolved(Author {
            id,
            username: "ranger".to_string(),
            email: "ranger@example.com".to_string(),
        }))
        .unwrap();
        assert_eq!(resolved["status"], "resolved");
        assert_eq!(resolved["username"], "ranger");
    }

    #[test]
    fn test_update_request_defaults() {
        let request: UpdateCampgroundRequest =
            serde_json::from_str(r#"{"deleteImages": ["a.jpg"]}"#).unwrap();

        assert!(request.campground.is_empty());
        assert!(request.files.is_empty());
        assert_eq!(request.delete_images, vec!["a.jpg".to_string()]);
    }

    #[test]
    fn test_input_validation() {
        let input = CampgroundInput {
            title: String::new(),
            description: String::new(),
            location: "Moab, Utah".to_string(),
            price: -1.0,
            tag: None,
        };

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("price"));
        assert!(!fields.contains_key("location"));
    }
}
