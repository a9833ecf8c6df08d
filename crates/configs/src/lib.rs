use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_BUCKET: &str = "event-images";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration value {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin allowed by CORS.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
            worker_threads: None,
        }
    }
}

/// Connection settings for the hosted data service.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    /// Elevated key, only used for listing the image bucket.
    #[serde(default)]
    pub service_role_key: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            service_role_key: String::new(),
            bucket: default_bucket(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Public base URL of this backend, the seeding routine posts to it.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: false, backend_url: default_backend_url() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8080 }
fn default_frontend_url() -> String { DEFAULT_FRONTEND_URL.into() }
fn default_backend_url() -> String { DEFAULT_BACKEND_URL.into() }
fn default_bucket() -> String { DEFAULT_BUCKET.into() }
fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 30 }

/// Read `CONFIG_PATH` (or `config.toml`). A missing file yields the defaults,
/// since the environment alone is a complete configuration source.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        tracing::debug!(%path, "config file not found, using environment only");
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File, then process environment, then validation.
    pub fn load_and_validate() -> Result<Self, ConfigError> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup; set variables win over the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SUPABASE_URL") { self.supabase.url = v; }
        if let Some(v) = get("SUPABASE_ANON_KEY") { self.supabase.anon_key = v; }
        if let Some(v) = get("SUPABASE_SERVICE_ROLE_KEY") { self.supabase.service_role_key = v; }
        if let Some(v) = get("SUPABASE_BUCKET") { self.supabase.bucket = v; }
        if let Some(v) = get("FRONTEND_URL") { self.server.frontend_url = v; }
        if let Some(v) = get("SERVER_HOST") { self.server.host = v; }
        if let Some(v) = get("PORT") { self.server.port = parse_var("PORT", &v)?; }
        if let Some(v) = get("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = Some(parse_var("TOKIO_WORKER_THREADS", &v)?);
        }
        if let Some(v) = get("BACKEND_URL") { self.seed.backend_url = v; }
        if let Some(v) = get("SEED_DRESS_CODES") { self.seed.enabled = parse_var("SEED_DRESS_CODES", &v)?; }
        if let Some(v) = get("HTTP_CONNECT_TIMEOUT_SECS") {
            self.http.connect_timeout_secs = parse_var("HTTP_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("HTTP_REQUEST_TIMEOUT_SECS") {
            self.http.request_timeout_secs = parse_var("HTTP_REQUEST_TIMEOUT_SECS", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supabase.url.trim().is_empty() {
            return Err(ConfigError::Missing("SUPABASE_URL"));
        }
        if self.supabase.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("SUPABASE_ANON_KEY"));
        }
        if self.supabase.service_role_key.trim().is_empty() {
            return Err(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"));
        }
        let lower = self.supabase.url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ConfigError::Invalid("SUPABASE_URL must start with http:// or https://".into()));
        }
        if self.supabase.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storage bucket name must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server port must be in 1..=65535".into()));
        }
        if self.server.worker_threads == Some(0) {
            return Err(ConfigError::Invalid("worker_threads must be >= 1".into()));
        }
        if self.http.connect_timeout_secs == 0 || self.http.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("http timeouts must be positive seconds".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid(format!("{key} has an invalid value: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ]
    }

    #[test]
    fn env_only_config_uses_defaults() -> anyhow::Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(lookup(&required()))?;
        cfg.validate()?;
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.frontend_url, DEFAULT_FRONTEND_URL);
        assert_eq!(cfg.supabase.bucket, DEFAULT_BUCKET);
        assert_eq!(cfg.seed.backend_url, DEFAULT_BACKEND_URL);
        assert!(!cfg.seed.enabled);
        assert_eq!(cfg.http.request_timeout(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn missing_anon_key_is_reported_by_name() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(lookup(&[("SUPABASE_URL", "https://x.supabase.co")])).unwrap();
        match cfg.validate() {
            Err(ConfigError::Missing(name)) => assert_eq!(name, "SUPABASE_ANON_KEY"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn blank_env_values_do_not_override() -> anyhow::Result<()> {
        let mut cfg = AppConfig::default();
        let mut vars = required();
        vars.push(("FRONTEND_URL", "  "));
        cfg.apply_env(lookup(&vars))?;
        assert_eq!(cfg.server.frontend_url, DEFAULT_FRONTEND_URL);
        Ok(())
    }

    #[test]
    fn env_overrides_port_origin_and_seed() -> anyhow::Result<()> {
        let mut cfg = AppConfig::default();
        let mut vars = required();
        vars.extend([
            ("PORT", "9090"),
            ("FRONTEND_URL", "https://wizard.example"),
            ("SEED_DRESS_CODES", "true"),
            ("BACKEND_URL", "https://api.wizard.example"),
        ]);
        cfg.apply_env(lookup(&vars))?;
        cfg.validate()?;
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9090");
        assert_eq!(cfg.server.frontend_url, "https://wizard.example");
        assert!(cfg.seed.enabled);
        assert_eq!(cfg.seed.backend_url, "https://api.wizard.example");
        Ok(())
    }

    #[test]
    fn unparsable_port_is_invalid() {
        let mut cfg = AppConfig::default();
        let err = cfg.apply_env(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_http_supabase_url_is_rejected() {
        let mut cfg = AppConfig::default();
        let mut vars = required();
        vars[0] = ("SUPABASE_URL", "postgres://db");
        cfg.apply_env(lookup(&vars)).unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn toml_sections_parse_with_defaults() -> anyhow::Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 3000

            [supabase]
            url = "https://project.supabase.co"
            anon_key = "anon"
            service_role_key = "service"
            "#,
        )?;
        cfg.validate()?;
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.supabase.bucket, DEFAULT_BUCKET);
        assert_eq!(cfg.http.connect_timeout_secs, 5);
        Ok(())
    }
}
