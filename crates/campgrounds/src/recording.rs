use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::geocoder::{GeocodeCandidate, Geocoder};
use crate::image_host::ImageHost;
use crate::types::CampgroundError;

/// Geocoder wrapper that records every query it forwards
pub(crate) struct RecordingGeocoder<G> {
    inner: G,
    requests: Mutex<Vec<(String, u32)>>,
}

impl<G: Geocoder> RecordingGeocoder<G> {
    pub(crate) fn new(inner: G) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far, with their limits
    pub(crate) async fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for RecordingGeocoder<G> {
    async fn forward_geocode(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<GeocodeCandidate>, CampgroundError> {
        self.requests.lock().await.push((query.to_string(), limit));
        self.inner.forward_geocode(query, limit).await
    }
}

/// Image host wrapper that records the filenames it deleted
pub(crate) struct RecordingImageHost<H> {
    inner: H,
    destroyed: Mutex<Vec<String>>,
}

impl<H: ImageHost> RecordingImageHost<H> {
    pub(crate) fn new(inner: H) -> Self {
        Self {
            inner,
            destroyed: Mutex::new(Vec::new()),
        }
    }

    /// Filenames successfully deleted so far
    pub(crate) async fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().await.clone()
    }
}

#[async_trait]
impl<H: ImageHost> ImageHost for RecordingImageHost<H> {
    async fn destroy(&self, filename: &str) -> Result<(), CampgroundError> {
        self.inner.destroy(filename).await?;
        self.destroyed.lock().await.push(filename.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoder::MockGeocoder;
    use crate::image_host::MockImageHost;
    use crate::types::Geometry;

    #[tokio::test]
    async fn test_records_forwarded_calls() {
        let geocoder = RecordingGeocoder::new(MockGeocoder::fixed(Geometry::point(1.0, 2.0)));
        let host = RecordingImageHost::new(MockImageHost::failing_on(["bad.jpg"]));

        geocoder.forward_geocode("Moab", 1).await.unwrap();
        host.destroy("good.jpg").await.unwrap();
        assert!(host.destroy("bad.jpg").await.is_err());

        assert_eq!(geocoder.requests().await, vec![("Moab".to_string(), 1)]);
        assert_eq!(host.destroyed().await, vec!["good.jpg".to_string()]);
    }
}
