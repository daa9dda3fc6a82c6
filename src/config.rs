use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    pub publishing: PublishingConfig,
    /// Households to set up at startup (skipped when already configured).
    #[serde(default)]
    pub households: Vec<HouseholdConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding config entries.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_scan_interval_secs() -> u64 {
    300
}

fn default_auth_timeout_secs() -> u64 {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            auth_timeout_secs: default_auth_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of coordinator updates kept in the broadcast channel for /ws/sensors.
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HouseholdConfig {
    pub url: String,
    pub token: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.polling.scan_interval_secs > 0,
            "polling.scan_interval_secs must be > 0, got {}",
            self.polling.scan_interval_secs
        );
        anyhow::ensure!(
            self.polling.auth_timeout_secs > 0,
            "polling.auth_timeout_secs must be > 0, got {}",
            self.polling.auth_timeout_secs
        );
        anyhow::ensure!(
            self.polling.fetch_timeout_secs > 0,
            "polling.fetch_timeout_secs must be > 0, got {}",
            self.polling.fetch_timeout_secs
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        for (i, household) in self.households.iter().enumerate() {
            anyhow::ensure!(
                !household.url.trim().is_empty(),
                "households[{}].url must be non-empty",
                i
            );
            anyhow::ensure!(
                !household.token.is_empty(),
                "households[{}].token must be non-empty",
                i
            );
        }
        Ok(())
    }
}
