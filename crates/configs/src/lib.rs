use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

/// Service name the descriptor id is derived from.
pub const DEFAULT_SERVICE_NAME: &str = "ILL availability - Z39.50";
pub const DEFAULT_API_NAMESPACE: &str = "/api/v1/contrib/ill_avail_z3950";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Where the key-value configuration blob lives.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_config_path")]
    pub config_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { config_path: default_config_path() }
    }
}

/// Static metadata advertised in every service descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_service_version")]
    pub version: String,
    #[serde(default = "default_api_namespace")]
    pub api_namespace: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            version: default_service_version(),
            api_namespace: default_api_namespace(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResolverConfig {
    /// When set, metadata without any searchable field yields "not serviceable"
    /// even if targets resolve for the context.
    #[serde(default)]
    pub require_metadata_match: bool,
}

fn default_config_path() -> String { "data/ill_avail_config.json".to_string() }
fn default_service_name() -> String { DEFAULT_SERVICE_NAME.to_string() }
fn default_service_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_api_namespace() -> String { DEFAULT_API_NAMESPACE.to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `CONFIG_PATH` (default `config.toml`), apply environment overrides
    /// and validate. A missing file means defaults; any other failure is returned.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.service.validate()?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        // ILL_CONFIG_PATH wins over the TOML value
        if let Ok(path) = std::env::var("ILL_CONFIG_PATH") {
            if !path.trim().is_empty() {
                self.config_path = path;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.config_path.trim().is_empty() {
            return Err(anyhow!("storage.config_path is empty; set it in config.toml or ILL_CONFIG_PATH"));
        }
        Ok(())
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("service.name must not be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(anyhow!("service.version must not be empty"));
        }
        if !self.api_namespace.starts_with('/') {
            return Err(anyhow!("service.api_namespace must start with '/'"));
        }
        Ok(())
    }
}
