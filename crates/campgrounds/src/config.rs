use std::sync::Arc;

use tracing::{info, warn};

use crate::geocoder::{Geocoder, MapboxGeocoder, MockGeocoder};
use crate::image_host::{CloudinaryImageHost, ImageHost, MockImageHost};
use crate::types::{CampgroundError, Geometry};

/// Default Mapbox API location
pub const MAPBOX_BASE_URL: &str = "https://api.mapbox.com";
/// Default Cloudinary API location
pub const CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com";

/// Credentials for the Mapbox geocoding API
#[derive(Debug, Clone)]
pub struct MapboxConfig {
    /// Public access token
    pub access_token: String,
    /// API root, overridable for proxies
    pub base_url: String,
}

impl MapboxConfig {
    /// Configuration against the public Mapbox API
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: MAPBOX_BASE_URL.to_string(),
        }
    }
}

/// Credentials for the Cloudinary upload API
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    /// Cloud (account) name
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used to sign requests
    pub api_secret: String,
    /// API root, overridable for proxies
    pub base_url: String,
}

impl CloudinaryConfig {
    /// Configuration against the public Cloudinary API
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: CLOUDINARY_BASE_URL.to_string(),
        }
    }
}

/// Configuration of the external services the mutation service calls.
///
/// A missing section selects the mock client for that service.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Geocoding credentials
    pub mapbox: Option<MapboxConfig>,
    /// Image host credentials
    pub cloudinary: Option<CloudinaryConfig>,
}

/// Shared handles to the external services, created once at startup
#[derive(Clone)]
pub struct ExternalServices {
    /// Forward geocoder
    pub geocoder: Arc<dyn Geocoder>,
    /// Image host
    pub image_host: Arc<dyn ImageHost>,
}

impl ExternalServices {
    /// Bundles already-built clients
    pub fn new(geocoder: Arc<dyn Geocoder>, image_host: Arc<dyn ImageHost>) -> Self {
        Self {
            geocoder,
            image_host,
        }
    }

    /// Builds the clients described by `config`, falling back to mocks for any
    /// service without credentials
    pub fn from_config(config: &ServiceConfig) -> Result<Self, CampgroundError> {
        let geocoder: Arc<dyn Geocoder> = match &config.mapbox {
            Some(mapbox) => {
                info!("Using Mapbox geocoder at {}", mapbox.base_url);
                Arc::new(MapboxGeocoder::new(mapbox)?)
            }
            None => {
                warn!("No Mapbox credentials configured, using mock geocoder");
                Arc::new(MockGeocoder::fixed(Geometry::point(-98.5795, 39.8283)))
            }
        };

        let image_host: Arc<dyn ImageHost> = match &config.cloudinary {
            Some(cloudinary) => {
                info!("Using Cloudinary image host for cloud {}", cloudinary.cloud_name);
                Arc::new(CloudinaryImageHost::new(cloudinary)?)
            }
            None => {
                warn!("No Cloudinary credentials configured, using mock image host");
                Arc::new(MockImageHost::new())
            }
        };

        Ok(Self::new(geocoder, image_host))
    }
}
