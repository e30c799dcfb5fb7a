use campgrounds::{CloudinaryConfig, MapboxConfig, ServiceConfig};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/campgrounds";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-this-in-production";

/// Server settings read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Secret used to verify author tokens
    pub jwt_secret: String,
    /// External service credentials
    pub services: ServiceConfig,
}

impl AppConfig {
    /// Reads the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("⚠️ JWT_SECRET is not set, using the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let mapbox = var("MAPBOX_TOKEN").map(MapboxConfig::new);

        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_KEY"),
            var("CLOUDINARY_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                Some(CloudinaryConfig::new(cloud_name, api_key, api_secret))
            }
            (None, None, None) => None,
            _ => {
                log::warn!("⚠️ Cloudinary credentials are incomplete, ignoring them");
                None
            }
        };

        Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            jwt_secret,
            services: ServiceConfig { mapbox, cloudinary },
        }
    }
}
