use axum::http::HeaderName;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// bcrypt rounds used when `PASSWORD_HASH_COST` is not set
pub const DEFAULT_HASH_COST: u32 = 5;
pub const DEFAULT_TOKEN_HEADER: &str = "authorization";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("{var} has an invalid value: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("password hash cost must be between 4 and 31, got {0}")]
    InvalidHashCost(u32),
}

/// Process-wide settings, read once at start-up and handed to the app state.
#[derive(Clone)]
pub struct AuthConfig {
    /// Name of the request header carrying the token on `/validate-token`
    pub token_header_key: HeaderName,
    jwt_secret_key: String,
    pub password_hash_cost: u32,
    /// Issued tokens carry an `exp` claim only when this is set
    pub token_ttl_secs: Option<u64>,
    pub bind_addr: SocketAddr,
    /// Falls back to the in-memory store when absent
    pub database_url: Option<String>,
}

impl AuthConfig {
    /// Config with defaults for everything except the signing secret
    pub fn new(jwt_secret_key: impl Into<String>) -> Self {
        Self {
            token_header_key: HeaderName::from_static(DEFAULT_TOKEN_HEADER),
            jwt_secret_key: jwt_secret_key.into(),
            password_hash_cost: DEFAULT_HASH_COST,
            token_ttl_secs: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source, used by `from_env` and tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret_key = lookup("JWT_SECRET_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar("JWT_SECRET_KEY"))?;

        let token_header_key = match lookup("TOKEN_HEADER_KEY") {
            Some(raw) => HeaderName::from_bytes(raw.trim().as_bytes()).map_err(|_| {
                ConfigError::InvalidValue {
                    var: "TOKEN_HEADER_KEY",
                    value: raw.clone(),
                }
            })?,
            None => HeaderName::from_static(DEFAULT_TOKEN_HEADER),
        };

        let password_hash_cost = match lookup("PASSWORD_HASH_COST") {
            Some(raw) => parse_var("PASSWORD_HASH_COST", &raw)?,
            None => DEFAULT_HASH_COST,
        };
        if !(4..=31).contains(&password_hash_cost) {
            return Err(ConfigError::InvalidHashCost(password_hash_cost));
        }

        let token_ttl_secs = lookup("TOKEN_TTL_SECS")
            .map(|raw| parse_var("TOKEN_TTL_SECS", &raw))
            .transpose()?;

        let bind_addr = parse_var(
            "BIND_ADDR",
            &lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        Ok(Self {
            token_header_key,
            jwt_secret_key,
            password_hash_cost,
            token_ttl_secs,
            bind_addr,
            database_url,
        })
    }

    pub fn jwt_secret_key(&self) -> &str {
        &self.jwt_secret_key
    }

    pub fn with_token_header_key(mut self, header: HeaderName) -> Self {
        self.token_header_key = header;
        self
    }

    pub fn with_token_ttl_secs(mut self, ttl: u64) -> Self {
        self.token_ttl_secs = Some(ttl);
        self
    }

    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}

// Keeps the secret out of logs
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_header_key", &self.token_header_key)
            .field("jwt_secret_key", &"<redacted>")
            .field("password_hash_cost", &self.password_hash_cost)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .finish()
    }
}
