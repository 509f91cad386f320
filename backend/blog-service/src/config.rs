/// Configuration management for Blog Service
///
/// All settings are read once from environment variables at startup and passed
/// by reference into the components that need them.
use s3_utils::S3Config;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token signing configuration
    pub jwt: JwtConfig,
    /// Outbound mail configuration
    pub email: EmailConfig,
    /// Media storage configuration
    pub s3: S3Config,
    /// Upload limits
    pub uploads: UploadConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub session_ttl_secs: i64,
    pub verification_ttl_secs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("verification_ttl_secs", &self.verification_ttl_secs)
            .finish()
    }
}

/// SMTP settings; an empty host puts the mailer in no-op mode
#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    #[serde(skip_serializing)]
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub use_starttls: bool,
    pub verification_base_url: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_from", &self.smtp_from)
            .field("use_starttls", &self.use_starttls)
            .field("verification_base_url", &self.verification_base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Per-file size limit in bytes
    pub max_file_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let parsed_or = |key: &str, default: i64| -> Result<i64, String> {
            match lookup(key) {
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| format!("{} must be an integer, got {:?}", key, value)),
                None => Ok(default),
            }
        };
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(default)
        };

        let app_env = var_or("APP_ENV", "development");
        let is_production = app_env.eq_ignore_ascii_case("production");

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(value) => value,
            None if is_production => {
                return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
            }
            None => "http://localhost:5173,http://localhost:3000".to_string(),
        };
        if is_production && allowed_origins.split(',').any(|o| o.trim() == "*") {
            return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
        }

        let database_url = lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?;

        let secret = lookup("JWT_SECRET").ok_or("JWT_SECRET must be set")?;
        if secret.len() < crypto_core::jwt::MIN_SECRET_BYTES {
            return Err(format!(
                "JWT_SECRET must be at least {} bytes",
                crypto_core::jwt::MIN_SECRET_BYTES
            ));
        }

        let port = parsed_or("APP_PORT", 8080)?;
        let port = u16::try_from(port).map_err(|_| format!("APP_PORT out of range: {}", port))?;

        let smtp_port = parsed_or("SMTP_PORT", 587)?;
        let smtp_port =
            u16::try_from(smtp_port).map_err(|_| format!("SMTP_PORT out of range: {}", smtp_port))?;

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: var_or("APP_HOST", "0.0.0.0"),
                port,
            },
            cors: CorsConfig { allowed_origins },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?.max(1) as u32,
            },
            jwt: JwtConfig {
                secret,
                session_ttl_secs: parsed_or("JWT_SESSION_TTL_SECS", 7 * 24 * 3600)?,
                verification_ttl_secs: parsed_or("JWT_VERIFICATION_TTL_SECS", 24 * 3600)?,
            },
            email: EmailConfig {
                smtp_host: var_or("SMTP_HOST", ""),
                smtp_port,
                smtp_username: lookup("SMTP_USERNAME").filter(|v| !v.is_empty()),
                smtp_password: lookup("SMTP_PASSWORD").filter(|v| !v.is_empty()),
                smtp_from: var_or("SMTP_FROM", "Blog <no-reply@localhost>"),
                use_starttls: flag("SMTP_STARTTLS", true),
                verification_base_url: var_or(
                    "EMAIL_VERIFICATION_BASE_URL",
                    "http://localhost:8080/api/v1/verify-email",
                ),
            },
            s3: S3Config::from_lookup(&lookup),
            uploads: UploadConfig {
                max_file_bytes: parsed_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?.max(1) as usize,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRET: &str = "config-test-secret-0123456789abcdefgh";

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.session_ttl_secs, 604_800);
        assert_eq!(config.jwt.verification_ttl_secs, 86_400);
        assert!(config.email.smtp_host.is_empty());
        assert_eq!(config.s3.key_prefix, "blog-images");
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert!(err.contains("DATABASE_URL"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", "short"),
        ]))
        .unwrap_err();
        assert!(err.contains("JWT_SECRET"));
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let err = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "*"),
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap_err();
        assert!(err.contains("'*'"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("APP_PORT", "eighty"),
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap_err();
        assert!(err.contains("APP_PORT"));
    }
}
