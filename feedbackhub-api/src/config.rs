/// Configuration management for the API server
///
/// Configuration is read from environment variables (and a `.env` file if
/// present) into a type-safe struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Access token lifetime, 1 to 525600 (default: 1440)
/// - `GEMINI_API_KEY`: Enables AI drafting when set
/// - `GEMINI_MODEL`: Model name (default: gemini-1.5-flash)
/// - `GEMINI_BASE_URL`: API root override
///
/// # Example
///
/// ```no_run
/// use feedbackhub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use feedbackhub_shared::ai::gemini::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use feedbackhub_shared::auth::jwt::DEFAULT_ACCESS_TOKEN_MINUTES;
use serde::{Deserialize, Serialize};
use std::env;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Longest accepted access token lifetime (one year)
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 60 * 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// AI drafting configuration
    pub ai: AiConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
}

/// AI drafting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Gemini API key; drafting is disabled without one
    pub api_key: Option<String>,

    pub model: String,

    pub base_url: String,
}

impl AiConfig {
    /// Gemini client settings, if a key is configured
    pub fn gemini(&self) -> Option<GeminiConfig> {
        let api_key = self.api_key.as_deref()?;
        Some(GeminiConfig {
            api_key: api_key.to_string(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        })
    }
}

fn parse_token_minutes(value: Option<&str>) -> anyhow::Result<i64> {
    let minutes = match value {
        Some(v) => v.trim().parse::<i64>()?,
        None => DEFAULT_ACCESS_TOKEN_MINUTES,
    };
    if !(1..=MAX_ACCESS_TOKEN_MINUTES).contains(&minutes) {
        anyhow::bail!(
            "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {}",
            MAX_ACCESS_TOKEN_MINUTES
        );
    }
    Ok(minutes)
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric variable does not parse or is out of range
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()?;
        let cors_origins =
            parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let access_token_minutes =
            parse_token_minutes(env::var("ACCESS_TOKEN_EXPIRE_MINUTES").ok().as_deref())?;

        let ai = AiConfig {
            api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_minutes,
            },
            ai,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.jwt.access_token_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                access_token_minutes: 30,
            },
            ai: AiConfig {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(sample().bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_token_lifetime() {
        assert_eq!(sample().token_lifetime(), chrono::Duration::minutes(30));
    }

    #[test]
    fn test_gemini_requires_key() {
        let mut config = sample();
        assert!(config.ai.gemini().is_none());

        config.ai.api_key = Some("key".to_string());
        let gemini = config.ai.gemini().unwrap();
        assert_eq!(gemini.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(
            parse_origins("https://a.example, ,https://b.example"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_token_minutes_bounds() {
        assert_eq!(parse_token_minutes(None).unwrap(), DEFAULT_ACCESS_TOKEN_MINUTES);
        assert_eq!(parse_token_minutes(Some("30")).unwrap(), 30);
        assert_eq!(
            parse_token_minutes(Some("525600")).unwrap(),
            MAX_ACCESS_TOKEN_MINUTES
        );
        assert!(parse_token_minutes(Some("0")).is_err());
        assert!(parse_token_minutes(Some("525601")).is_err());
        assert!(parse_token_minutes(Some("9223372036854775807")).is_err());
        assert!(parse_token_minutes(Some("soon")).is_err());
    }
}
