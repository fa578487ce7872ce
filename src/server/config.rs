use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,

    /// bcrypt work factor for new password hashes.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub struct PartialServerConfig {
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub listen_addr: Option<String>,
    pub log_dir: Option<String>,
    pub token_ttl_hours: Option<i64>,
    pub max_db_connections: Option<u32>,
    pub bcrypt_cost: Option<u32>,
}

fn default_database_url() -> String {
    "sqlite://recipes.db?mode=rwc".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_max_db_connections() -> u32 {
    10
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) => Self::read_file(Path::new(path_str))?,
            None => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::from_layers(file_config, env_config)
    }

    /// A missing file is treated as empty.
    pub fn read_file(path: &Path) -> Result<PartialServerConfig, String> {
        if !path.exists() {
            return Ok(PartialServerConfig::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }

    pub fn from_layers(
        file_config: PartialServerConfig,
        env_config: PartialServerConfig,
    ) -> Result<Self, String> {
        let jwt_secret = env_config
            .jwt_secret
            .or(file_config.jwt_secret)
            .filter(|secret| !secret.is_empty())
            .ok_or("JWT_SECRET is required")?;

        let token_ttl_hours = env_config
            .token_ttl_hours
            .or(file_config.token_ttl_hours)
            .unwrap_or_else(default_token_ttl_hours);
        if token_ttl_hours <= 0 {
            return Err(format!("TOKEN_TTL_HOURS must be positive, got {token_ttl_hours}"));
        }

        let bcrypt_cost = env_config
            .bcrypt_cost
            .or(file_config.bcrypt_cost)
            .unwrap_or_else(default_bcrypt_cost);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(format!("BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"));
        }

        Ok(ServerConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .unwrap_or_else(default_database_url),
            jwt_secret,
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            token_ttl_hours,
            max_db_connections: env_config
                .max_db_connections
                .or(file_config.max_db_connections)
                .unwrap_or_else(default_max_db_connections),
            bcrypt_cost,
        })
    }
}
