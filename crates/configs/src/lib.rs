use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// MongoDB connection settings. `uri` has no default: a missing connection
/// string must stop the process before it serves traffic.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_app_name")]
    pub app_name: Option<String>,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default)]
    pub min_pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_server_selection_timeout")]
    pub server_selection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            name: default_db_name(),
            collection: default_collection(),
            app_name: default_app_name(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: 0,
            connect_timeout_secs: default_connect_timeout(),
            server_selection_timeout_secs: default_server_selection_timeout(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8000 }
fn default_db_name() -> String { "caballerosdb".into() }
fn default_collection() -> String { "caballeros".into() }
fn default_app_name() -> Option<String> { Some("ms-edicion-caballeros".into()) }
fn default_max_pool_size() -> u32 { 10 }
fn default_connect_timeout() -> u64 { 10 }
fn default_server_selection_timeout() -> u64 { 30 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (optional), overlay process environment, validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env_with(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup; set variables win over the file.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("SERVER_PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = non_empty("TOKIO_WORKER_THREADS").and_then(|w| w.trim().parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(uri) = non_empty("MONGO_URI") {
            self.database.uri = uri;
        }
        if let Some(name) = non_empty("MONGO_DB") {
            self.database.name = name;
        }
        if let Some(collection) = non_empty("MONGO_COLLECTION") {
            self.database.collection = collection;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        self.database.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(anyhow!("MONGO_URI is not set; provide database.uri in config.toml or the MONGO_URI environment variable"));
        }
        let lower = self.uri.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!("database.uri must start with mongodb:// or mongodb+srv://"));
        }
        if self.name.trim().is_empty() {
            return Err(anyhow!("database.name must not be empty"));
        }
        if self.collection.trim().is_empty() {
            return Err(anyhow!("database.collection must not be empty"));
        }
        if self.max_pool_size == 0 {
            return Err(anyhow!("database.max_pool_size must be >= 1"));
        }
        if self.max_pool_size < self.min_pool_size {
            return Err(anyhow!("database.max_pool_size must be >= min_pool_size"));
        }
        if self.connect_timeout_secs == 0 || self.server_selection_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}
