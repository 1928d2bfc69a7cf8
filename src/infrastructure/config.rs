use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub influx: InfluxSettings,
    #[serde(default)]
    pub feeds: FeedSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default = "default_device_tag")]
    pub device_tag: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_history_hours")]
    pub history_hours: i32,
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            history_hours: default_history_hours(),
            max_points: default_max_points(),
            cache_capacity: default_cache_capacity(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_measurement() -> String {
    "telemetry".to_string()
}

fn default_device_tag() -> String {
    "device".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_history_hours() -> i32 {
    6
}

fn default_max_points() -> usize {
    150
}

fn default_cache_capacity() -> usize {
    32
}

fn default_timeout_secs() -> u64 {
    10
}

/// Load `config/dashboard.*`, overridden by `FLOOR_TELEMETRY__SECTION__KEY`
/// environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(
            config::Environment::with_prefix("FLOOR_TELEMETRY")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_keys() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            api_key = "secret"

            [influx]
            host = "http://influx:8086/"
            token = "t"
            database = "building"
            retention_policy = "autogen"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.influx.measurement, "telemetry");
        assert_eq!(config.influx.device_tag, "device");
        assert_eq!(config.feeds.history_hours, 6);
        assert_eq!(config.feeds.max_points, 150);
        assert_eq!(config.feeds.cache_capacity, 32);
        assert!(config.feeds.api_key.is_empty());
    }

    #[test]
    fn test_feed_section_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            bind = "127.0.0.1:9000"
            api_key = "secret"

            [influx]
            host = "http://influx:8086"
            token = "t"
            database = "building"
            retention_policy = "autogen"

            [feeds]
            base_url = "http://api:9000"
            api_key = "secret"
            cache_capacity = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.feeds.base_url, "http://api:9000");
        assert_eq!(config.feeds.cache_capacity, 4);
        assert_eq!(config.feeds.timeout_secs, 10);
    }

    #[test]
    fn test_shipped_config_parses() {
        let raw = include_str!("../../config/dashboard.toml");
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert!(!config.server.api_key.is_empty());
    }
}
