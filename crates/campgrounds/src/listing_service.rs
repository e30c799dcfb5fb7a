use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::expander::RelationExpander;
use crate::query_builder::{QueryDescriptor, build_listing_query};
use crate::store::CampgroundStore;
use crate::types::*;

/// Service for listing and displaying campgrounds
#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn CampgroundStore>,
    expander: RelationExpander,
}

impl ListingService {
    /// Creates a new instance of `ListingService` reading from `store`
    pub fn new(store: Arc<dyn CampgroundStore>) -> Self {
        Self {
            expander: RelationExpander::new(store.clone()),
            store,
        }
    }

    /// Lists campgrounds for a listing request.
    ///
    /// Only a text search that finds nothing carries a [`NoResultsNotice`]; an empty
    /// result from any other branch is returned without one.
    pub async fn list_campgrounds(
        &self,
        params: &ListingParams,
    ) -> Result<CampgroundListing, CampgroundError> {
        let query = build_listing_query(params);
        debug!("Listing campgrounds with {:?}", query);

        let campgrounds = self.store.find(&query).await?;
        let notice = if query.is_search() && campgrounds.is_empty() {
            Some(NoResultsNotice::default())
        } else {
            None
        };

        let campgrounds = self.expander.expand_all(campgrounds).await?;

        Ok(CampgroundListing {
            campgrounds,
            notice,
        })
    }

    /// Gets a campground by id with its author and reviews resolved
    pub async fn show_detail(&self, id: Uuid) -> Result<CampgroundView, CampgroundError> {
        let campground = self.edit_form(id).await?;
        self.expander.expand_one(campground).await
    }

    /// Gets a campground by id as stored, for pre-filling an edit form
    pub async fn edit_form(&self, id: Uuid) -> Result<Campground, CampgroundError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(CampgroundError::NotFound(id))
    }

    /// Gets every campground, unexpanded, for the cluster map
    pub async fn map_campgrounds(&self) -> Result<Vec<Campground>, CampgroundError> {
        self.store.find(&QueryDescriptor::match_all()).await
    }
}
