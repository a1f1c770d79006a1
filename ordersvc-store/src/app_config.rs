use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub kafka: KafkaConfig,
    pub payment: PaymentConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub message_timeout_ms: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: String::new(),
            topic: String::new(),
            message_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaymentConfig {
    /// Base URL of the payment service; requests go to `<url>/payment`.
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    pub apm_url: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub service_name: String,
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            apm_url: None,
            log_level: "debug".to_string(),
            log_format: LogFormat::Json,
            service_name: "ordersvcs".to_string(),
            environment: "dev".to_string(),
        }
    }
}

/// Variable names used by earlier deployments, mapped to config keys.
/// These win over every other source.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("KAFKA_BROKER_URL", "kafka.brokers"),
    ("KAFKA_TOPIC", "kafka.topic"),
    ("PAYMENT_URL", "payment.url"),
    ("ELASTIC_APM_SERVER_URL", "telemetry.apm_url"),
    ("LOG_LEVEL", "telemetry.log_level"),
    ("SERVICE_NAME", "telemetry.service_name"),
    ("ENVIRONMENT", "telemetry.environment"),
];

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `ORDERSVC__KAFKA__TOPIC=orders` sets `kafka.topic`
            .add_source(config::Environment::with_prefix("ORDERSVC").separator("__"));

        Self::from_sources(builder, |name| env::var(name).ok())
    }

    /// Build from `builder`, layering legacy variables found through `lookup`
    /// on top, and validate the result.
    pub fn from_sources<F>(
        builder: ConfigBuilder<DefaultState>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let builder = apply_legacy_env(builder, lookup)?;
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Every required value present and well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kafka.brokers.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "kafka.brokers",
                env: "KAFKA_BROKER_URL",
            });
        }
        if self.kafka.topic.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "kafka.topic",
                env: "KAFKA_TOPIC",
            });
        }
        if self.payment.url.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "payment.url",
                env: "PAYMENT_URL",
            });
        }
        check_http_url("payment.url", &self.payment.url)?;
        if let Some(apm_url) = &self.telemetry.apm_url {
            check_http_url("telemetry.apm_url", apm_url)?;
        }
        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "telemetry.service_name",
                env: "SERVICE_NAME",
            });
        }
        parse_log_level(&self.telemetry.log_level)?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        parse_log_level(&self.telemetry.log_level)
    }
}

fn apply_legacy_env<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in LEGACY_ENV {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override(*key, value)?;
        }
    }

    if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
        builder = builder.set_override("server.port", i64::from(parse_port(&port)?))?;
    }

    Ok(builder)
}

/// Accepts `8080`, `:8080` and `host:8080`.
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let value = value.trim();
    let digits = value.rsplit(':').next().unwrap_or(value);
    digits
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort(value.to_string()))
}

pub fn parse_log_level(level: &str) -> Result<tracing::Level, ConfigError> {
    match level.trim().to_lowercase().as_str() {
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}

fn check_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("missing required configuration value {key} (or {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    #[error("invalid log level <{0}>")]
    InvalidLogLevel(String),

    #[error("invalid URL for {key}: {value}")]
    InvalidUrl { key: &'static str, value: String },

    #[error("invalid port: {0}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};
    use std::collections::HashMap;

    const COMPLETE: &str = r#"
        [server]
        port = 9000

        [kafka]
        brokers = "kafka:9092"
        topic = "orders"

        [payment]
        url = "http://payment:8081"

        [telemetry]
        log_level = "info"
        log_format = "pretty"
        environment = "staging"
    "#;

    fn builder(toml: &str) -> ConfigBuilder<DefaultState> {
        config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml))
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_complete_config() {
        let config = Config::from_sources(builder(COMPLETE), no_env).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.kafka.brokers, "kafka:9092");
        assert_eq!(config.kafka.message_timeout_ms, 5000);
        assert_eq!(config.payment.timeout_ms, 10_000);
        assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
        assert_eq!(config.telemetry.service_name, "ordersvcs");
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
        assert!(config.telemetry.apm_url.is_none());
    }

    #[test]
    fn test_missing_required_value_is_fatal() {
        let err = Config::from_sources(builder("[kafka]\nbrokers = \"kafka:9092\""), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "kafka.topic", .. }));

        let err = Config::from_sources(builder(""), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "kafka.brokers", .. }));
    }

    #[test]
    fn test_legacy_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("KAFKA_BROKER_URL", "broker-1:9092"),
            ("KAFKA_TOPIC", "new-orders"),
            ("PAYMENT_URL", "http://payments.internal"),
            ("PORT", ":8088"),
            ("LOG_LEVEL", "WARN"),
        ]);
        let config =
            Config::from_sources(builder(""), |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.kafka.brokers, "broker-1:9092");
        assert_eq!(config.kafka.topic, "new-orders");
        assert_eq!(config.payment.url, "http://payments.internal");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.log_level().unwrap(), tracing::Level::WARN);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_level = COMPLETE.replace("log_level = \"info\"", "log_level = \"verbose\"");
        assert!(matches!(
            Config::from_sources(builder(&bad_level), no_env).unwrap_err(),
            ConfigError::InvalidLogLevel(_)
        ));

        let bad_url = COMPLETE.replace("http://payment:8081", "payment:8081");
        assert!(matches!(
            Config::from_sources(builder(&bad_url), no_env).unwrap_err(),
            ConfigError::InvalidUrl { key: "payment.url", .. }
        ));

        let bad_port = |name: &str| (name == "PORT").then(|| "eighty".to_string());
        assert!(matches!(
            Config::from_sources(builder(COMPLETE), bad_port).unwrap_err(),
            ConfigError::InvalidPort(_)
        ));
    }

    #[test]
    fn test_parse_port_forms() {
        assert_eq!(parse_port("8080").unwrap(), 8080);
        assert_eq!(parse_port(":8080").unwrap(), 8080);
        assert_eq!(parse_port("0.0.0.0:8081").unwrap(), 8081);
        assert!(parse_port("").is_err());
    }
}
