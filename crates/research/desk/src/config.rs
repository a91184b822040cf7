//! Configuration for research-desk
//!
//! Layers, lowest precedence first: built-in defaults, optional config
//! file, `RESEARCH_DESK_*` environment variables, the hosting platform's
//! `PORT` / `RAILWAY_ENVIRONMENT` variables, then CLI flags.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default port when neither config nor `PORT` name one
pub const DEFAULT_PORT: u16 = 8080;

/// Main desk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Research engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Session lifetime configuration
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            enable_cors: true,
            max_body_size: default_max_body_size(),
        }
    }
}

/// Which research engine the desk drives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineConfig {
    /// In-process scripted engine (development)
    #[default]
    Scripted,

    /// Hosted graph server reached over HTTP
    Remote {
        /// Base URL of the graph server
        url: String,

        /// Graph to run on each thread
        #[serde(default = "default_assistant_id")]
        assistant_id: String,

        /// Optional API key
        #[serde(default)]
        api_key: Option<String>,

        /// Request timeout in seconds
        #[serde(default = "default_engine_timeout")]
        timeout_secs: u64,
    },
}

impl EngineConfig {
    pub fn remote(url: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        EngineConfig::Remote {
            url: url.into(),
            assistant_id: assistant_id.into(),
            api_key: None,
            timeout_secs: default_engine_timeout(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EngineConfig::Scripted => "scripted",
            EngineConfig::Remote { .. } => "remote",
        }
    }
}

/// Session lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions untouched for this long are expired and their engine thread released
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// How often the sweeper looks for idle sessions
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Sweep period, never shorter than one second
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_assistant_id() -> String {
    "research_assistant".to_string()
}

fn default_engine_timeout() -> u64 {
    300
}

fn default_idle_timeout() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DeskConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`DeskConfig::load`], reading `RESEARCH_DESK_*` variables from
    /// `env` instead of the process environment when given
    pub fn load_with_env(
        path: Option<&str>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DeskConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // e.g. RESEARCH_DESK_LOGGING__LEVEL. A remote engine needs both
        // RESEARCH_DESK_ENGINE__TYPE=remote and RESEARCH_DESK_ENGINE__URL.
        builder = builder.add_source(
            config::Environment::with_prefix("RESEARCH_DESK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let raw = builder.build()?;
        check_engine_type(&raw)?;
        raw.try_deserialize()
    }

    /// Fold the hosting platform's settings into this configuration.
    ///
    /// Production binds every interface and quietens the default log level.
    pub fn apply_deployment(&mut self, deployment: &Deployment) {
        let port = deployment
            .port
            .unwrap_or_else(|| self.server.listen_addr.port());
        let ip = if deployment.production {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            self.server.listen_addr.ip()
        };
        self.server.listen_addr = SocketAddr::new(ip, port);

        if deployment.production && self.logging.level == default_log_level() {
            self.logging.level = "warn".to_string();
        }
    }
}

/// Keys only the remote engine reads require `engine.type = "remote"`
fn check_engine_type(raw: &config::Config) -> Result<(), config::ConfigError> {
    let engine_type = raw.get_string("engine.type").unwrap_or_default();
    if engine_type == "remote" {
        return Ok(());
    }

    for key in ["url", "assistant_id", "api_key", "timeout_secs"] {
        if raw.get_string(&format!("engine.{}", key)).is_ok() {
            return Err(config::ConfigError::Message(format!(
                "engine.{} is set but engine.type is '{}'; set engine.type = \"remote\" \
                 (RESEARCH_DESK_ENGINE__TYPE=remote) to use a remote engine",
                key, engine_type
            )));
        }
    }
    Ok(())
}

// ── Deployment detection ─────────────────────────────────────────────

/// Hosting environment derived from process environment variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deployment {
    /// `RAILWAY_ENVIRONMENT` is set
    pub production: bool,
    /// Port from `PORT`, if set
    pub port: Option<u16>,
}

impl Deployment {
    /// Inspect the real process environment
    pub fn detect() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Inspect an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let production = lookup("RAILWAY_ENVIRONMENT").is_some();
        let port = match lookup("PORT") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .map_err(|e| format!("Invalid PORT '{}': {}", raw, e))?,
            ),
            None => None,
        };

        Ok(Self { production, port })
    }

    pub fn label(&self) -> &'static str {
        if self.production {
            "Production (Railway)"
        } else {
            "Development (Local)"
        }
    }

    /// Host shown in the access URL
    pub fn access_host(&self) -> &'static str {
        if self.production {
            "0.0.0.0"
        } else {
            "localhost"
        }
    }
}

/// Startup banner printed to the console
pub fn startup_banner(config: &DeskConfig, deployment: &Deployment) -> String {
    let port = config.server.listen_addr.port();
    format!(
        r#"
  ____                               _
 |  _ \ ___  ___  ___  __ _ _ __ ___| |__
 | |_) / _ \/ __|/ _ \/ _` | '__/ __| '_ \
 |  _ <  __/\__ \  __/ (_| | | | (__| | | |
 |_| \_\___||___/\___|\__,_|_|  \___|_| |_|  Desk

  Version: {}
  Engine: {}
Starting application on port {}
Environment: {}
🌐 Access the app at: http://{}:{}
"#,
        env!("CARGO_PKG_VERSION"),
        config.engine.kind(),
        port,
        deployment.label(),
        deployment.access_host(),
        port
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = DeskConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert!(config.server.listen_addr.ip().is_loopback());
        assert!(matches!(config.engine, EngineConfig::Scripted));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_local_deployment() {
        let deployment = Deployment::from_lookup(lookup(&[])).unwrap();
        assert!(!deployment.production);
        assert_eq!(deployment.port, None);

        let mut config = DeskConfig::default();
        config.apply_deployment(&deployment);
        assert_eq!(config.server.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_production_deployment() {
        let deployment = Deployment::from_lookup(lookup(&[
            ("RAILWAY_ENVIRONMENT", "production"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert!(deployment.production);

        let mut config = DeskConfig::default();
        config.apply_deployment(&deployment);
        assert_eq!(config.server.listen_addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_explicit_log_level_survives_production() {
        let deployment =
            Deployment::from_lookup(lookup(&[("RAILWAY_ENVIRONMENT", "prod")])).unwrap();
        let mut config = DeskConfig::default();
        config.logging.level = "debug".to_string();
        config.apply_deployment(&deployment);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Deployment::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.contains("Invalid PORT"));
    }

    #[test]
    fn test_banner_mentions_environment_and_url() {
        let deployment = Deployment::from_lookup(lookup(&[("PORT", "7860")])).unwrap();
        let mut config = DeskConfig::default();
        config.apply_deployment(&deployment);

        let banner = startup_banner(&config, &deployment);
        assert!(banner.contains("Starting application on port 7860"));
        assert!(banner.contains("Environment: Development (Local)"));
        assert!(banner.contains("http://localhost:7860"));
        assert!(banner.contains("Engine: scripted"));
    }

    #[test]
    fn test_remote_engine_deserializes_with_defaults() {
        let engine: EngineConfig = serde_json::from_value(serde_json::json!({
            "type": "remote",
            "url": "http://127.0.0.1:2024"
        }))
        .unwrap();
        match engine {
            EngineConfig::Remote {
                url,
                assistant_id,
                api_key,
                timeout_secs,
            } => {
                assert_eq!(url, "http://127.0.0.1:2024");
                assert_eq!(assistant_id, "research_assistant");
                assert!(api_key.is_none());
                assert_eq!(timeout_secs, 300);
            }
            EngineConfig::Scripted => panic!("expected remote engine"),
        }
    }

    fn env(vars: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_selects_remote_engine() {
        let config = DeskConfig::load_with_env(
            None,
            env(&[
                ("RESEARCH_DESK_ENGINE__TYPE", "remote"),
                ("RESEARCH_DESK_ENGINE__URL", "http://127.0.0.1:2024"),
            ]),
        )
        .unwrap();

        assert_eq!(config.engine.kind(), "remote");
        match config.engine {
            EngineConfig::Remote { url, assistant_id, .. } => {
                assert_eq!(url, "http://127.0.0.1:2024");
                assert_eq!(assistant_id, "research_assistant");
            }
            EngineConfig::Scripted => panic!("expected remote engine"),
        }
    }

    #[test]
    fn test_engine_url_without_remote_type_rejected() {
        let err = DeskConfig::load_with_env(
            None,
            env(&[("RESEARCH_DESK_ENGINE__URL", "http://127.0.0.1:2024")]),
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("engine.url"));
        assert!(message.contains("RESEARCH_DESK_ENGINE__TYPE=remote"));
    }

    #[test]
    fn test_env_overrides_nested_sections() {
        let config = DeskConfig::load_with_env(
            None,
            env(&[
                ("RESEARCH_DESK_LOGGING__LEVEL", "debug"),
                ("RESEARCH_DESK_SESSIONS__IDLE_TIMEOUT_SECS", "120"),
            ]),
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.sessions.idle_timeout(), Duration::from_secs(120));
        assert_eq!(config.engine.kind(), "scripted");
    }

    #[test]
    fn test_sweep_interval_has_floor() {
        let sessions = SessionConfig {
            idle_timeout_secs: 10,
            sweep_interval_secs: 0,
        };
        assert_eq!(sessions.sweep_interval(), Duration::from_secs(1));
    }
}
