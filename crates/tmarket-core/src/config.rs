use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub auth_mode: AuthMode,
    pub cors_origins: Vec<String>,
    /// Upper bound on the external geolocation lookup, milliseconds.
    pub geo_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// All routes open — local development only.
    None,
    /// Admin routes require `Authorization: Bearer <token>`. Holds the
    /// expected token value read from `TMARKET_ADMIN_TOKEN`.
    Token(String),
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("TMARKET_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            auth_mode: {
                let raw = std::env::var("TMARKET_AUTH").unwrap_or_else(|_| "token".to_string());
                match raw.as_str() {
                    "none" => AuthMode::None,
                    _ => {
                        let token = std::env::var("TMARKET_ADMIN_TOKEN").map_err(|_| {
                            "TMARKET_ADMIN_TOKEN required unless TMARKET_AUTH=none".to_string()
                        })?;
                        AuthMode::Token(token)
                    }
                }
            },
            cors_origins: std::env::var("TMARKET_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            geo_timeout_ms: std::env::var("TMARKET_GEO_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
        })
    }

    pub fn geo_timeout(&self) -> Duration {
        Duration::from_millis(self.geo_timeout_ms)
    }
}
