/// Configuration for the catalogue API server
///
/// Loaded from environment variables (a `.env` file is honoured in
/// development).
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default `0.0.0.0:8080`)
/// - `API_PRODUCTION`: enables HSTS and `Secure` cookies (default `false`)
/// - `API_CORS_ORIGINS`: comma-separated origins, `*` for any (default `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
/// - `MEDIA_ROOT`: media directory; uploads are staged in `temp/` (default `./media`)
/// - `MEDIA_URL`: public prefix of media files (default `/media/`)
/// - `SESSION_TTL_HOURS`: session lifetime, 1 to 8760 (default 12)
/// - `VISION_MODEL_CACHE`: CLIP model cache directory (optional)
/// - `VISION_DEVICE`: `auto`, `cpu` or `cuda` (default `auto`)
/// - `IMAGE_MATCH_THRESHOLD`: minimum match probability (default 0.60)
/// - `VISION_LOGIT_SCALE`: similarity temperature (default 100)
///
/// # Example
///
/// ```no_run
/// use catalogue_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Listening on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use catalogue_shared::vision::{InferenceDevice, DEFAULT_LOGIT_SCALE, DEFAULT_MATCH_THRESHOLD};
use std::env;
use std::path::PathBuf;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub session: SessionConfig,
    pub vision: VisionConfig,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Production mode: HSTS header and `Secure` cookies
    pub production: bool,

    /// Allowed CORS origins (`*` = permissive)
    pub cors_origins: Vec<String>,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Media storage
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Filesystem root of uploaded and catalogue media
    pub root: PathBuf,

    /// URL prefix under which `root` is served
    pub url: String,
}

/// Login sessions
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
}

/// Image search model settings
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub cache_dir: Option<PathBuf>,
    pub device: InferenceDevice,
    pub match_threshold: f32,
    pub logit_scale: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            device: InferenceDevice::Auto,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            logit_scale: DEFAULT_LOGIT_SCALE,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or any value fails to
    /// parse or is out of range.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = var_or("API_PORT", "8080").parse::<u16>()?;
        let production = var_or("API_PRODUCTION", "false").parse::<bool>()?;
        let cors_origins = parse_origins(&var_or("API_CORS_ORIGINS", "*"));

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10").parse::<u32>()?;

        let ttl_hours = parse_session_ttl_hours(&var_or("SESSION_TTL_HOURS", "12"))?;

        let device = var_or("VISION_DEVICE", "auto")
            .parse::<InferenceDevice>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let match_threshold = var_or("IMAGE_MATCH_THRESHOLD", "0.60").parse::<f32>()?;
        if !(0.0..=1.0).contains(&match_threshold) {
            anyhow::bail!("IMAGE_MATCH_THRESHOLD must be between 0 and 1");
        }

        let logit_scale = var_or("VISION_LOGIT_SCALE", "100").parse::<f32>()?;
        if !(logit_scale.is_finite() && logit_scale > 0.0) {
            anyhow::bail!("VISION_LOGIT_SCALE must be a positive number");
        }

        Ok(Self {
            api: ApiConfig {
                host: var_or("API_HOST", "0.0.0.0"),
                port,
                production,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            media: MediaConfig {
                root: PathBuf::from(var_or("MEDIA_ROOT", "./media")),
                url: var_or("MEDIA_URL", "/media/"),
            },
            session: SessionConfig { ttl_hours },
            vision: VisionConfig {
                cache_dir: env::var("VISION_MODEL_CACHE").ok().map(PathBuf::from),
                device,
                match_threshold,
                logit_scale,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Session lifetime as a chrono duration
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session.ttl_hours)
    }
}

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

fn parse_session_ttl_hours(raw: &str) -> anyhow::Result<i64> {
    let hours = raw.trim().parse::<i64>()?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        anyhow::bail!(
            "SESSION_TTL_HOURS must be between 1 and {}, got {}",
            MAX_SESSION_TTL_HOURS,
            hours
        );
    }
    Ok(hours)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            production: false,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://localhost/catalogue_test".to_string(),
            max_connections: 5,
        },
        media: MediaConfig {
            root: PathBuf::from("./media"),
            url: "/media/".to_string(),
        },
        session: SessionConfig { ttl_hours: 12 },
        vision: VisionConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_session_ttl() {
        assert_eq!(test_config().session_ttl(), chrono::Duration::hours(12));
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_session_ttl_hours_range() {
        assert_eq!(parse_session_ttl_hours("12").unwrap(), 12);
        assert_eq!(parse_session_ttl_hours(" 1 ").unwrap(), 1);
        assert_eq!(
            parse_session_ttl_hours(&MAX_SESSION_TTL_HOURS.to_string()).unwrap(),
            MAX_SESSION_TTL_HOURS
        );

        assert!(parse_session_ttl_hours("0").is_err());
        assert!(parse_session_ttl_hours("-3").is_err());
        assert!(parse_session_ttl_hours("9000000000000000").is_err());
        assert!(parse_session_ttl_hours("twelve").is_err());
    }

    #[test]
    fn test_longest_session_ttl_converts() {
        let mut config = test_config();
        config.session.ttl_hours = MAX_SESSION_TTL_HOURS;
        assert_eq!(config.session_ttl().num_days(), 365);
    }

    #[test]
    fn test_vision_defaults() {
        let vision = VisionConfig::default();
        assert_eq!(vision.match_threshold, 0.60);
        assert_eq!(vision.logit_scale, 100.0);
        assert_eq!(vision.device, InferenceDevice::Auto);
    }
}
