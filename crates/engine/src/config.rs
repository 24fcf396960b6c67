//! Process configuration read from the environment.

use std::net::{AddrParseError, SocketAddr};

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    /// `*`, or a comma-separated origin list. `None` disables CORS.
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            cors_allowed_origins: Some("*".to_string()),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.into());

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, default = DEFAULT_PORT, "Invalid port, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let cors_allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => Some(raw.trim().to_string()).filter(|s| !s.is_empty()),
            None => Some("*".to_string()),
        };

        Self {
            server_host,
            server_port,
            cors_allowed_origins,
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server_host, self.server_port).parse()
    }

    /// CORS layer for the configured origins, if any usable origin is set.
    pub fn cors_layer(&self) -> Option<CorsLayer> {
        let allowed_origins = self.cors_allowed_origins.as_deref()?;

        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([axum::http::header::CONTENT_TYPE]);

        if allowed_origins == "*" {
            return Some(cors.allow_origin(Any));
        }

        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }
        Some(cors.allow_origin(origins))
    }
}

/// Load `.env.local` then `.env` from the repository root, when present.
///
/// Values already set in the environment are not overridden.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
