use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::ExternalServices;
use crate::store::CampgroundStore;
use crate::types::*;

/// Service for creating, updating and deleting campgrounds
#[derive(Clone)]
pub struct MutationService {
    store: Arc<dyn CampgroundStore>,
    services: ExternalServices,
}

impl MutationService {
    /// Creates a new instance of `MutationService` with the provided store and external clients
    pub fn new(store: Arc<dyn CampgroundStore>, services: ExternalServices) -> Self {
        Self { store, services }
    }

    /// Creates a campground owned by `author_id`.
    ///
    /// The location is geocoded first; if the geocoder finds nothing the campground
    /// is not persisted.
    pub async fn create(
        &self,
        input: &CampgroundInput,
        files: &[UploadedFile],
        author_id: Uuid,
    ) -> Result<Campground, CampgroundError> {
        let input = input.normalized();
        input
            .validate()
            .map_err(|e| CampgroundError::Validation(format!("Validation error: {}", e)))?;

        let candidates = self
            .services
            .geocoder
            .forward_geocode(&input.location, 1)
            .await?;

        let Some(candidate) = candidates.into_iter().next() else {
            warn!("No geocoding result for location '{}'", input.location);
            return Err(CampgroundError::GeocodingFailure(input.location.clone()));
        };

        let campground = self
            .store
            .insert(NewCampground {
                title: input.title.clone(),
                description: input.description.clone(),
                location: input.location.clone(),
                geometry: candidate.geometry,
                price: input.price,
                rating: 0.0,
                tag: input.tag.clone(),
                images: new_images(&[], files),
                author_id,
            })
            .await?;

        info!(
            "Created campground {} ({} images) for author {}",
            campground.id,
            campground.images.len(),
            author_id
        );

        Ok(campground)
    }

    /// Updates a campground's fields and images.
    ///
    /// New files are appended to the image list. Each filename in `images_to_delete`
    /// is deleted from the image host, and only the filenames the host deleted are
    /// pruned from the campground; the rest are reported back and left in place.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &CampgroundPatch,
        files: &[UploadedFile],
        images_to_delete: &[String],
    ) -> Result<UpdatedCampground, CampgroundError> {
        let patch = patch.normalized();
        patch
            .validate()
            .map_err(|e| CampgroundError::Validation(format!("Validation error: {}", e)))?;

        let campground = self
            .store
            .update_fields(id, &patch)
            .await?
            .ok_or(CampgroundError::NotFound(id))?;

        let appended = new_images(&campground.images, files);
        if !appended.is_empty() {
            self.store.push_images(id, &appended).await?;
        }

        let mut failed_image_deletions = Vec::new();
        if !images_to_delete.is_empty() {
            let mut seen = HashSet::new();
            let filenames: Vec<&String> = images_to_delete
                .iter()
                .filter(|name| seen.insert(name.as_str()))
                .collect();

            let image_host = &self.services.image_host;
            let results = join_all(filenames.into_iter().map(|filename| async move {
                (filename, image_host.destroy(filename).await)
            }))
            .await;

            let mut deleted = Vec::new();
            for (filename, result) in results {
                match result {
                    Ok(()) => deleted.push(filename.clone()),
                    Err(e) => {
                        warn!(
                            "Failed to delete image {} of campground {}: {}",
                            filename, id, e
                        );
                        failed_image_deletions.push(filename.clone());
                    }
                }
            }

            if !deleted.is_empty() {
                self.store.pull_images(id, &deleted).await?;
            }
        }

        let campground = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(CampgroundError::NotFound(id))?;

        info!(
            "Updated campground {} (+{} images, {} deletions failed)",
            id,
            appended.len(),
            failed_image_deletions.len()
        );

        Ok(UpdatedCampground {
            campground,
            failed_image_deletions,
        })
    }

    /// Deletes a campground. Deleting a campground that does not exist succeeds.
    ///
    /// Reviews and hosted images of the campground are left untouched.
    pub async fn delete(&self, id: Uuid) -> Result<(), CampgroundError> {
        if self.store.delete(id).await? {
            info!("Deleted campground {}", id);
        } else {
            debug!("Campground {} does not exist, nothing to delete", id);
        }

        Ok(())
    }
}

/// Maps uploads to image references, skipping filenames already present in
/// `existing` or repeated within `files`
fn new_images(existing: &[ImageRef], files: &[UploadedFile]) -> Vec<ImageRef> {
    let mut seen: HashSet<&str> = existing.iter().map(|i| i.filename.as_str()).collect();

    files
        .iter()
        .filter(|file| {
            let fresh = seen.insert(file.filename.as_str());
            if !fresh {
                warn!("Skipping duplicate image filename {}", file.filename);
            }
            fresh
        })
        .map(UploadedFile::to_image_ref)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoder::{GeocodeCandidate, MockGeocoder};
    use crate::image_host::MockImageHost;
    use crate::memory_store::MemoryCampgroundStore;
    use crate::recording::{RecordingGeocoder, RecordingImageHost};

    struct Fixture {
        store: Arc<MemoryCampgroundStore>,
        geocoder: Arc<RecordingGeocoder<MockGeocoder>>,
        image_host: Arc<RecordingImageHost<MockImageHost>>,
        service: MutationService,
    }

    fn fixture(geocoder: MockGeocoder, image_host: MockImageHost) -> Fixture {
        let store = Arc::new(MemoryCampgroundStore::new());
        let geocoder = Arc::new(RecordingGeocoder::new(geocoder));
        let image_host = Arc::new(RecordingImageHost::new(image_host));
        let service = MutationService::new(
            store.clone(),
            ExternalServices::new(geocoder.clone(), image_host.clone()),
        );

        Fixture {
            store,
            geocoder,
            image_host,
            service,
        }
    }

    fn input() -> CampgroundInput {
        CampgroundInput {
            title: "Mirror Lake".to_string(),
            description: "Reflections all day".to_string(),
            location: "Yosemite, California".to_string(),
            price: 25.0,
            tag: Some("Lakeside".to_string()),
        }
    }

    fn upload(filename: &str) -> UploadedFile {
        UploadedFile {
            path: format!("https://img.example.com/{}", filename),
            filename: filename.to_string(),
        }
    }

    fn filenames(campground: &Campground) -> Vec<&str> {
        campground
            .images
            .iter()
            .map(|i| i.filename.as_str())
            .collect()
    }

    async fn created(fixture: &Fixture, files: &[UploadedFile]) -> Campground {
        fixture
            .service
            .create(&input(), files, Uuid::new_v4())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_geocodes_and_maps_files() {
        let fixture = fixture(
            MockGeocoder::returning(vec![
                GeocodeCandidate {
                    place_name: None,
                    geometry: Geometry::point(-119.53, 37.74),
                },
                GeocodeCandidate {
                    place_name: None,
                    geometry: Geometry::point(0.0, 0.0),
                },
            ]),
            MockImageHost::new(),
        );
        let author_id = Uuid::new_v4();

        let campground = fixture
            .service
            .create(&input(), &[upload("a.jpg"), upload("b.jpg")], author_id)
            .await
            .unwrap();

        assert_eq!(campground.geometry, Geometry::point(-119.53, 37.74));
        assert_eq!(campground.author_id, author_id);
        assert_eq!(campground.rating, 0.0);
        assert!(campground.review_ids.is_empty());
        assert_eq!(
            campground.images,
            vec![
                ImageRef {
                    url: "https://img.example.com/a.jpg".to_string(),
                    filename: "a.jpg".to_string(),
                },
                ImageRef {
                    url: "https://img.example.com/b.jpg".to_string(),
                    filename: "b.jpg".to_string(),
                },
            ]
        );
        assert_eq!(
            fixture.geocoder.requests().await,
            vec![("Yosemite, California".to_string(), 1)]
        );
        assert_eq!(
            fixture.store.find_by_id(campground.id).await.unwrap(),
            Some(campground)
        );
    }

    #[tokio::test]
    async fn test_create_without_geocoding_result_persists_nothing() {
        let fixture = fixture(MockGeocoder::empty(), MockImageHost::new());

        let result = fixture
            .service
            .create(&input(), &[upload("a.jpg")], Uuid::new_v4())
            .await;

        assert!(
            matches!(result, Err(CampgroundError::GeocodingFailure(ref location)) if location == "Yosemite, California")
        );
        assert_eq!(fixture.store.campground_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_before_geocoding() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let mut bad = input();
        bad.title = String::new();

        let result = fixture.service.create(&bad, &[], Uuid::new_v4()).await;

        assert!(matches!(result, Err(CampgroundError::Validation(_))));
        assert!(fixture.geocoder.requests().await.is_empty());
        assert_eq!(fixture.store.campground_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_skips_duplicate_filenames() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );

        let campground = created(&fixture, &[upload("a.jpg"), upload("a.jpg")]).await;

        assert_eq!(filenames(&campground), vec!["a.jpg"]);
    }

    #[tokio::test]
    async fn test_update_removes_deleted_image() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let campground = created(&fixture, &[upload("img1.jpg"), upload("img2.jpg")]).await;

        let updated = fixture
            .service
            .update(
                campground.id,
                &CampgroundPatch::default(),
                &[],
                &["img1.jpg".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(filenames(&updated.campground), vec!["img2.jpg"]);
        assert!(updated.failed_image_deletions.is_empty());
        assert_eq!(
            fixture.image_host.destroyed().await,
            vec!["img1.jpg".to_string()]
        );
        let stored = fixture
            .store
            .find_by_id(campground.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(filenames(&stored), vec!["img2.jpg"]);
    }

    #[tokio::test]
    async fn test_update_keeps_images_whose_deletion_failed() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::failing_on(["img1.jpg"]),
        );
        let campground = created(
            &fixture,
            &[upload("img1.jpg"), upload("img2.jpg"), upload("img3.jpg")],
        )
        .await;

        let updated = fixture
            .service
            .update(
                campground.id,
                &CampgroundPatch::default(),
                &[],
                &["img1.jpg".to_string(), "img2.jpg".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(filenames(&updated.campground), vec!["img1.jpg", "img3.jpg"]);
        assert_eq!(updated.failed_image_deletions, vec!["img1.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_update_ignores_unknown_filenames() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let campground = created(&fixture, &[upload("img1.jpg")]).await;

        let updated = fixture
            .service
            .update(
                campground.id,
                &CampgroundPatch::default(),
                &[],
                &["nope.jpg".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(filenames(&updated.campground), vec!["img1.jpg"]);
        assert!(updated.failed_image_deletions.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_appends_images() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let campground = created(&fixture, &[upload("img1.jpg")]).await;
        let patch = CampgroundPatch {
            title: Some("Mirror Lake North".to_string()),
            location: Some("Somewhere else".to_string()),
            price: Some(30.0),
            ..Default::default()
        };

        let updated = fixture
            .service
            .update(
                campground.id,
                &patch,
                &[upload("img1.jpg"), upload("img2.jpg")],
                &[],
            )
            .await
            .unwrap()
            .campground;

        assert_eq!(updated.title, "Mirror Lake North");
        assert_eq!(updated.location, "Somewhere else");
        assert_eq!(updated.price, 30.0);
        assert_eq!(updated.description, campground.description);
        assert_eq!(updated.tag, campground.tag);
        assert_eq!(updated.author_id, campground.author_id);
        assert_eq!(updated.geometry, campground.geometry);
        assert_eq!(filenames(&updated), vec!["img1.jpg", "img2.jpg"]);
        assert_eq!(fixture.geocoder.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_campground() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let id = Uuid::new_v4();

        let result = fixture
            .service
            .update(id, &CampgroundPatch::default(), &[upload("a.jpg")], &[])
            .await;

        assert!(matches!(result, Err(CampgroundError::NotFound(missing)) if missing == id));
        assert!(fixture.image_host.destroyed().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let mut blank = input();
        blank.title = "   ".to_string();

        let result = fixture.service.create(&blank, &[], Uuid::new_v4()).await;

        assert!(matches!(result, Err(CampgroundError::Validation(_))));
        assert!(fixture.geocoder.requests().await.is_empty());
        assert_eq!(fixture.store.campground_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_trims_title_and_location() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let mut padded = input();
        padded.title = "  Mirror Lake  ".to_string();
        padded.location = " Yosemite, California\n".to_string();

        let campground = fixture
            .service
            .create(&padded, &[], Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(campground.title, "Mirror Lake");
        assert_eq!(campground.location, "Yosemite, California");
        assert_eq!(
            fixture.geocoder.requests().await,
            vec![("Yosemite, California".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title_and_trims_values() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let campground = created(&fixture, &[]).await;

        let blank = CampgroundPatch {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        let result = fixture.service.update(campground.id, &blank, &[], &[]).await;
        assert!(matches!(result, Err(CampgroundError::Validation(_))));

        let padded = CampgroundPatch {
            title: Some("  x  ".to_string()),
            ..Default::default()
        };
        let updated = fixture
            .service
            .update(campground.id, &padded, &[], &[])
            .await
            .unwrap();
        assert_eq!(updated.campground.title, "x");

        let stored = fixture
            .store
            .find_by_id(campground.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "x");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let fixture = fixture(
            MockGeocoder::fixed(Geometry::point(1.0, 1.0)),
            MockImageHost::new(),
        );
        let campground = created(&fixture, &[upload("img1.jpg")]).await;

        fixture.service.delete(campground.id).await.unwrap();
        fixture.service.delete(campground.id).await.unwrap();
        fixture.service.delete(Uuid::new_v4()).await.unwrap();

        assert_eq!(fixture.store.campground_count().await, 0);
        assert!(fixture.image_host.destroyed().await.is_empty());
    }
}
