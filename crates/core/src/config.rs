use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: Option<SecretString>,
    pub anon_key: Option<SecretString>,
    pub table: String,
    pub timeout_secs: u64,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub currency_symbol: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Rest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub store_url: Option<String>,
    pub store_table: Option<String>,
    pub service_key: Option<String>,
    pub anon_key: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub currency_symbol: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                url: String::new(),
                service_key: None,
                anon_key: None,
                table: "products".to_string(),
                timeout_secs: 30,
                max_connections: 5,
            },
            pricing: PricingConfig { currency_symbol: "₹".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl StoreConfig {
    /// The service key when configured, else the anon key. Blank keys count as absent.
    pub fn access_key(&self) -> Option<&SecretString> {
        let present = |key: &&SecretString| !key.expose_secret().trim().is_empty();
        self.service_key.as_ref().filter(present).or_else(|| self.anon_key.as_ref().filter(present))
    }

    pub fn kind(&self) -> Option<StoreKind> {
        let url = self.url.trim();
        if url.starts_with("sqlite:") || url == ":memory:" {
            Some(StoreKind::Sqlite)
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Some(StoreKind::Rest)
        } else {
            None
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("pricecast.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(url) = store.url {
                self.store.url = url;
            }
            if let Some(service_key_value) = store.service_key {
                self.store.service_key = Some(secret_value(service_key_value));
            }
            if let Some(anon_key_value) = store.anon_key {
                self.store.anon_key = Some(secret_value(anon_key_value));
            }
            if let Some(table) = store.table {
                self.store.table = table;
            }
            if let Some(timeout_secs) = store.timeout_secs {
                self.store.timeout_secs = timeout_secs;
            }
            if let Some(max_connections) = store.max_connections {
                self.store.max_connections = max_connections;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(currency_symbol) = pricing.currency_symbol {
                self.pricing.currency_symbol = currency_symbol;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // the NEXT_PUBLIC_/SUPABASE_ names let an existing hosted `.env.local` work as is
        let url =
            read_env("PRICECAST_STORE_URL").or_else(|| read_env("NEXT_PUBLIC_SUPABASE_URL"));
        if let Some(value) = url {
            self.store.url = value;
        }
        let service_key = read_env("PRICECAST_STORE_SERVICE_KEY")
            .or_else(|| read_env("SUPABASE_SERVICE_ROLE_KEY"));
        if let Some(value) = service_key {
            self.store.service_key = Some(secret_value(value));
        }
        let anon_key = read_env("PRICECAST_STORE_ANON_KEY")
            .or_else(|| read_env("NEXT_PUBLIC_SUPABASE_ANON_KEY"));
        if let Some(value) = anon_key {
            self.store.anon_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PRICECAST_STORE_TABLE") {
            self.store.table = value;
        }
        if let Some(value) = read_env("PRICECAST_STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = parse_u64("PRICECAST_STORE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("PRICECAST_STORE_MAX_CONNECTIONS") {
            self.store.max_connections = parse_u32("PRICECAST_STORE_MAX_CONNECTIONS", &value)?;
        }

        if let Some(value) = read_env("PRICECAST_PRICING_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = value;
        }

        let log_level =
            read_env("PRICECAST_LOGGING_LEVEL").or_else(|| read_env("PRICECAST_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PRICECAST_LOGGING_FORMAT").or_else(|| read_env("PRICECAST_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(store_url) = overrides.store_url {
            self.store.url = store_url;
        }
        if let Some(store_table) = overrides.store_table {
            self.store.table = store_table;
        }
        if let Some(service_key) = overrides.service_key {
            self.store.service_key = Some(secret_value(service_key));
        }
        if let Some(anon_key) = overrides.anon_key {
            self.store.anon_key = Some(secret_value(anon_key));
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(currency_symbol) = overrides.currency_symbol {
            self.pricing.currency_symbol = currency_symbol;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("pricecast.toml"), PathBuf::from("config/pricecast.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store.url is required. Set PRICECAST_STORE_URL to a `sqlite:` URL or the https:// base URL of the product API".to_string(),
        ));
    }

    match store.kind() {
        Some(StoreKind::Rest) => {
            if store.access_key().is_none() {
                return Err(ConfigError::Validation(
                    "store.service_key or store.anon_key is required for an http(s) store url"
                        .to_string(),
                ));
            }
        }
        Some(StoreKind::Sqlite) => {}
        None => {
            return Err(ConfigError::Validation(
                "store.url must be a sqlite URL (`sqlite:...`, `:memory:`) or start with http:// or https://"
                    .to_string(),
            ));
        }
    }

    let table = store.table.trim();
    let plain_identifier = !table.is_empty()
        && table.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        && !table.starts_with(|ch: char| ch.is_ascii_digit());
    if !plain_identifier {
        return Err(ConfigError::Validation(
            "store.table must be a plain identifier (letters, digits, underscores)".to_string(),
        ));
    }

    if store.timeout_secs == 0 || store.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "store.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if store.max_connections == 0 {
        return Err(ConfigError::Validation(
            "store.max_connections must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.currency_symbol.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pricing.currency_symbol must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    url: Option<String>,
    service_key: Option<String>,
    anon_key: Option<String>,
    table: Option<String>,
    timeout_secs: Option<u64>,
    max_connections: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    currency_symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, StoreKind};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const CONFIG_VARS: [&str; 14] = [
        "PRICECAST_STORE_URL",
        "NEXT_PUBLIC_SUPABASE_URL",
        "SUPABASE_SERVICE_ROLE_KEY",
        "NEXT_PUBLIC_SUPABASE_ANON_KEY",
        "PRICECAST_STORE_SERVICE_KEY",
        "PRICECAST_STORE_ANON_KEY",
        "PRICECAST_STORE_TABLE",
        "PRICECAST_STORE_TIMEOUT_SECS",
        "PRICECAST_STORE_MAX_CONNECTIONS",
        "PRICECAST_LOG_LEVEL",
        "PRICECAST_LOG_FORMAT",
        "PRICECAST_LOGGING_LEVEL",
        "PRICECAST_LOGGING_FORMAT",
        "PRICECAST_PRICING_CURRENCY_SYMBOL",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn expect_validation(
        result: Result<AppConfig, ConfigError>,
        fragment: &str,
    ) -> Result<(), String> {
        match result {
            Ok(_) => Err("expected validation failure but config load succeeded".to_string()),
            Err(ConfigError::Validation(message)) if message.contains(fragment) => Ok(()),
            Err(other) => Err(format!("unexpected error: {other}")),
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("TEST_PRICECAST_URL", "https://catalog.example.test");
        env::set_var("TEST_PRICECAST_SERVICE_KEY", "service-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("pricecast.toml");
            fs::write(
                &path,
                r#"
[store]
url = "${TEST_PRICECAST_URL}"
service_key = "${TEST_PRICECAST_SERVICE_KEY}"
table = "catalog_items"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.url == "https://catalog.example.test",
                "store url should be interpolated from environment",
            )?;
            ensure(
                config.store.access_key().map(|key| key.expose_secret().to_string())
                    == Some("service-from-env".to_string()),
                "service key should be interpolated from environment",
            )?;
            ensure(config.store.table == "catalog_items", "table should come from file")?;
            ensure(config.store.kind() == Some(StoreKind::Rest), "https url is a rest store")?;
            Ok(())
        })();

        clear_vars(&["TEST_PRICECAST_URL", "TEST_PRICECAST_SERVICE_KEY"]);
        result
    }

    #[test]
    fn service_key_is_preferred_over_anon_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("PRICECAST_STORE_URL", "https://catalog.example.test");
        env::set_var("PRICECAST_STORE_ANON_KEY", "anon-key");
        env::set_var("PRICECAST_STORE_SERVICE_KEY", "service-key");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(
                config.store.access_key().map(|key| key.expose_secret().to_string())
                    == Some("service-key".to_string()),
                "service key should win over anon key",
            )?;

            env::remove_var("PRICECAST_STORE_SERVICE_KEY");
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(
                config.store.access_key().map(|key| key.expose_secret().to_string())
                    == Some("anon-key".to_string()),
                "anon key should be used when no service key is set",
            )
        })();

        clear_vars(&CONFIG_VARS);
        result
    }

    #[test]
    fn hosted_env_names_are_fallbacks() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("NEXT_PUBLIC_SUPABASE_URL", "https://hosted.example.test");
        env::set_var("NEXT_PUBLIC_SUPABASE_ANON_KEY", "hosted-anon");
        env::set_var("SUPABASE_SERVICE_ROLE_KEY", "hosted-service");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(config.store.url == "https://hosted.example.test", "hosted url is read")?;
            ensure(
                config.store.access_key().map(|key| key.expose_secret().to_string())
                    == Some("hosted-service".to_string()),
                "service role key should win over the anon key",
            )?;

            env::set_var("PRICECAST_STORE_URL", "https://primary.example.test");
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(
                config.store.url == "https://primary.example.test",
                "PRICECAST_STORE_URL should beat the hosted name",
            )
        })();

        clear_vars(&CONFIG_VARS);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("PRICECAST_STORE_URL", "sqlite::memory:");
        env::set_var("PRICECAST_LOG_LEVEL", "warn");
        env::set_var("PRICECAST_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            ensure(config.store.kind() == Some(StoreKind::Sqlite), "sqlite url needs no key")?;
            Ok(())
        })();

        clear_vars(&CONFIG_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("PRICECAST_STORE_URL", "sqlite://from-env.db");
        env::set_var("PRICECAST_PRICING_CURRENCY_SYMBOL", "$");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("pricecast.toml");
            fs::write(
                &path,
                r#"
[store]
url = "sqlite://from-file.db"
timeout_secs = 12

[pricing]
currency_symbol = "€"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    store_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.url == "sqlite://from-override.db",
                "override store url should win",
            )?;
            ensure(config.store.timeout_secs == 12, "file timeout should beat defaults")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.pricing.currency_symbol == "$",
                "env currency symbol should win over file and defaults",
            )?;
            Ok(())
        })();

        clear_vars(&CONFIG_VARS);
        result
    }

    #[test]
    fn missing_url_is_fatal() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        expect_validation(AppConfig::load(LoadOptions::default()), "store.url")
    }

    #[test]
    fn rest_store_without_key_is_fatal() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("PRICECAST_STORE_URL", "https://catalog.example.test");
        let result =
            expect_validation(AppConfig::load(LoadOptions::default()), "store.service_key");

        clear_vars(&CONFIG_VARS);
        result
    }

    #[test]
    fn table_name_must_be_plain_identifier() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("PRICECAST_STORE_URL", "sqlite::memory:");
        env::set_var("PRICECAST_STORE_TABLE", "products; drop table products");
        let result = expect_validation(AppConfig::load(LoadOptions::default()), "store.table");

        clear_vars(&CONFIG_VARS);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("PRICECAST_STORE_URL", "sqlite::memory:");
        env::set_var("PRICECAST_STORE_TIMEOUT_SECS", "soon");
        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. })
                if key == "PRICECAST_STORE_TIMEOUT_SECS" =>
            {
                Ok(())
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("expected invalid override error".to_string()),
        };

        clear_vars(&CONFIG_VARS);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&CONFIG_VARS);

        env::set_var("PRICECAST_STORE_URL", "https://catalog.example.test");
        env::set_var("PRICECAST_STORE_SERVICE_KEY", "service-secret-value");
        env::set_var("PRICECAST_STORE_ANON_KEY", "anon-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("service-secret-value"),
                "debug output should not contain service key",
            )?;
            ensure(
                !debug.contains("anon-secret-value"),
                "debug output should not contain anon key",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            ensure(config.pricing.currency_symbol == "₹", "default currency symbol")?;
            Ok(())
        })();

        clear_vars(&CONFIG_VARS);
        result
    }
}
