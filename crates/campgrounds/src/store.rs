use async_trait::async_trait;
use uuid::Uuid;

use crate::query_builder::QueryDescriptor;
use crate::types::*;

/// Persistence operations the campground services rely on.
///
/// Implementations own the translation of a [`QueryDescriptor`] into their native
/// query language. Single-record writes are expected to be atomic; no concurrency
/// control is layered on top.
#[async_trait]
pub trait CampgroundStore: Send + Sync {
    /// Runs a descriptor and returns the matching campgrounds
    async fn find(&self, query: &QueryDescriptor) -> Result<Vec<Campground>, CampgroundError>;

    /// Looks up a campground by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campground>, CampgroundError>;

    /// Persists a new campground and returns it with its assigned id
    async fn insert(&self, campground: NewCampground) -> Result<Campground, CampgroundError>;

    /// Merges the set fields of `patch` into a campground, returning `None` if it does not exist
    async fn update_fields(
        &self,
        id: Uuid,
        patch: &CampgroundPatch,
    ) -> Result<Option<Campground>, CampgroundError>;

    /// Appends images to the end of a campground's image list
    async fn push_images(&self, id: Uuid, images: &[ImageRef]) -> Result<(), CampgroundError>;

    /// Removes every image whose filename is listed
    async fn pull_images(&self, id: Uuid, filenames: &[String]) -> Result<(), CampgroundError>;

    /// Deletes a campground, returning whether it existed
    async fn delete(&self, id: Uuid) -> Result<bool, CampgroundError>;

    /// Fetches the reviews with the given ids, in no particular order
    async fn find_reviews(&self, ids: &[Uuid]) -> Result<Vec<Review>, CampgroundError>;

    /// Fetches the authors with the given ids, in no particular order
    async fn find_authors(&self, ids: &[Uuid]) -> Result<Vec<Author>, CampgroundError>;
}
