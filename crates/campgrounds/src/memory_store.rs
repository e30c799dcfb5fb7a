use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use regex::{Regex, RegexBuilder};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::query_builder::*;
use crate::store::CampgroundStore;
use crate::types::*;

#[derive(Default)]
struct MemoryState {
    /// Campgrounds in insertion order, which is the natural order of queries
    campgrounds: Vec<Campground>,
    reviews: HashMap<Uuid, Review>,
    authors: HashMap<Uuid, Author>,
}

/// Campground store kept entirely in memory.
///
/// Evaluates descriptors the way a document store would: text search as a
/// case-insensitive regex over title and location, tag filters by membership, and
/// sorts on top of insertion order.
#[derive(Default)]
pub struct MemoryCampgroundStore {
    state: RwLock<MemoryState>,
}

impl MemoryCampgroundStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an author
    pub async fn add_author(&self, author: Author) {
        self.state.write().await.authors.insert(author.id, author);
    }

    /// Stores a campground as-is, keeping its id and relations
    pub async fn seed(&self, campground: Campground) {
        self.state.write().await.campgrounds.push(campground);
    }

    /// Stores a review and appends it to a campground's review list
    pub async fn add_review(&self, campground_id: Uuid, review: Review) -> Result<(), CampgroundError> {
        let mut state = self.state.write().await;
        let campground = state
            .campgrounds
            .iter_mut()
            .find(|c| c.id == campground_id)
            .ok_or(CampgroundError::NotFound(campground_id))?;

        campground.review_ids.push(review.id);
        state.reviews.insert(review.id, review);
        Ok(())
    }

    /// Number of stored campgrounds
    pub async fn campground_count(&self) -> usize {
        self.state.read().await.campgrounds.len()
    }
}

fn compile_search(pattern: &str) -> Result<Regex, CampgroundError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CampgroundError::Validation(format!("Invalid search pattern: {}", e)))
}

fn sort_key(campground: &Campground, field: SortField) -> f64 {
    match field {
        SortField::Rating => campground.rating,
        SortField::Price => campground.price,
    }
}

#[async_trait]
impl CampgroundStore for MemoryCampgroundStore {
    async fn find(&self, query: &QueryDescriptor) -> Result<Vec<Campground>, CampgroundError> {
        let search = match &query.filter {
            CampgroundFilter::TextSearch { pattern } => Some(compile_search(pattern)?),
            _ => None,
        };

        let state = self.state.read().await;
        let mut found: Vec<Campground> = state
            .campgrounds
            .iter()
            .filter(|c| match &query.filter {
                CampgroundFilter::All => true,
                CampgroundFilter::TextSearch { .. } => search
                    .as_ref()
                    .is_some_and(|re| re.is_match(&c.title) || re.is_match(&c.location)),
                CampgroundFilter::TagIn { tags } => {
                    c.tag.as_ref().is_some_and(|tag| tags.contains(tag))
                }
            })
            .cloned()
            .collect();

        if let Some(sort) = query.sort {
            // Stable, so ties keep insertion order
            found.sort_by(|a, b| {
                let ordering = sort_key(a, sort.field).total_cmp(&sort_key(b, sort.field));
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campground>, CampgroundError> {
        let state = self.state.read().await;
        Ok(state.campgrounds.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, campground: NewCampground) -> Result<Campground, CampgroundError> {
        let now = Utc::now();
        let campground = Campground {
            id: Uuid::new_v4(),
            title: campground.title,
            description: campground.description,
            location: campground.location,
            geometry: campground.geometry,
            price: campground.price,
            rating: campground.rating,
            tag: campground.tag,
            images: campground.images,
            author_id: campground.author_id,
            review_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.campgrounds.push(campground.clone());
        Ok(campground)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        patch: &CampgroundPatch,
    ) -> Result<Option<Campground>, CampgroundError> {
        let mut state = self.state.write().await;
        let Some(campground) = state.campgrounds.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        if let Some(title) = &patch.title {
            campground.title = title.clone();
        }
        if let Some(description) = &patch.description {
            campground.description = description.clone();
        }
        if let Some(location) = &patch.location {
            campground.location = location.clone();
        }
        if let Some(price) = patch.price {
            campground.price = price;
        }
        if let Some(tag) = &patch.tag {
            campground.tag = Some(tag.clone());
        }
        campground.updated_at = Utc::now();

        Ok(Some(campground.clone()))
    }

    async fn push_images(&self, id: Uuid, images: &[ImageRef]) -> Result<(), CampgroundError> {
        let mut state = self.state.write().await;
        let campground = state
            .campgrounds
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CampgroundError::NotFound(id))?;

        campground.images.extend_from_slice(images);
        campground.updated_at = Utc::now();
        Ok(())
    }

    async fn pull_images(&self, id: Uuid, filenames: &[String]) -> Result<(), CampgroundError> {
        let mut state = self.state.write().await;
        let campground = state
            .campgrounds
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CampgroundError::NotFound(id))?;

        campground
            .images
            .retain(|image| !filenames.contains(&image.filename));
        campground.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CampgroundError> {
        let mut state = self.state.write().await;
        let before = state.campgrounds.len();
        state.campgrounds.retain(|c| c.id != id);
        Ok(state.campgrounds.len() != before)
    }

    async fn find_reviews(&self, ids: &[Uuid]) -> Result<Vec<Review>, CampgroundError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.reviews.get(id).cloned())
            .collect())
    }

    async fn find_authors(&self, ids: &[Uuid]) -> Result<Vec<Author>, CampgroundError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.authors.get(id).cloned())
            .collect())
    }
}
