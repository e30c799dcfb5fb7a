use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::store::CampgroundStore;
use crate::types::*;

/// Resolves the review and author references of campgrounds for display.
///
/// The join is two levels deep: campground to reviews, and both campground and
/// reviews to their authors. Lookups are batched, so expanding a whole listing
/// costs one review query and one author query.
#[derive(Clone)]
pub struct RelationExpander {
    store: Arc<dyn CampgroundStore>,
}

impl RelationExpander {
    /// Creates an expander reading from `store`
    pub fn new(store: Arc<dyn CampgroundStore>) -> Self {
        Self { store }
    }

    /// Expands a single campground
    pub async fn expand_one(&self, campground: Campground) -> Result<CampgroundView, CampgroundError> {
        let id = campground.id;
        self.expand_all(vec![campground])
            .await?
            .pop()
            .ok_or(CampgroundError::NotFound(id))
    }

    /// Expands campgrounds, preserving their order
    pub async fn expand_all(
        &self,
        campgrounds: Vec<Campground>,
    ) -> Result<Vec<CampgroundView>, CampgroundError> {
        if campgrounds.is_empty() {
            return Ok(Vec::new());
        }

        let review_ids = unique(campgrounds.iter().flat_map(|c| c.review_ids.iter().copied()));
        let reviews: HashMap<Uuid, Review> = if review_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .find_reviews(&review_ids)
                .await?
                .into_iter()
                .map(|review| (review.id, review))
                .collect()
        };

        let author_ids = unique(
            campgrounds
                .iter()
                .map(|c| c.author_id)
                .chain(reviews.values().map(|r| r.author_id)),
        );
        let authors: HashMap<Uuid, Author> = self
            .store
            .find_authors(&author_ids)
            .await?
            .into_iter()
            .map(|author| (author.id, author))
            .collect();

        Ok(campgrounds
            .into_iter()
            .map(|campground| build_view(campground, &reviews, &authors))
            .collect())
    }
}

/// Deduplicates ids, keeping first-seen order
fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn resolve_author(id: Uuid, authors: &HashMap<Uuid, Author>) -> AuthorRef {
    match authors.get(&id) {
        Some(author) => AuthorRef::Resolved(author.clone()),
        None => {
            warn!("Author {} is referenced but does not exist", id);
            AuthorRef::Missing { id }
        }
    }
}

fn build_view(
    campground: Campground,
    reviews: &HashMap<Uuid, Review>,
    authors: &HashMap<Uuid, Author>,
) -> CampgroundView {
    let review_views = campground
        .review_ids
        .iter()
        .filter_map(|review_id| match reviews.get(review_id) {
            Some(review) => Some(ReviewView {
                id: review.id,
                body: review.body.clone(),
                rating: review.rating,
                author: resolve_author(review.author_id, authors),
            }),
            None => {
                warn!(
                    "Campground {} references missing review {}",
                    campground.id, review_id
                );
                None
            }
        })
        .collect();

    CampgroundView {
        id: campground.id,
        title: campground.title,
        description: campground.description,
        location: campground.location,
        geometry: campground.geometry,
        price: campground.price,
        rating: campground.rating,
        tag: campground.tag,
        images: campground.images,
        author: resolve_author(campground.author_id, authors),
        reviews: review_views,
        created_at: campground.created_at,
        updated_at: campground.updated_at,
    }
}
