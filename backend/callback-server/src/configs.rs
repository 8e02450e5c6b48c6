use std::path::PathBuf;

use domain_types::merchant_config::{GatewayCredential, MerchantConfig};

use crate::{error::ConfigurationError, logger::config::Log};

#[derive(Clone, serde::Deserialize, Debug)]
pub struct Config {
    pub common: Common,
    pub server: Server,
    pub metrics: MetricsServer,
    pub log: Log,
    pub merchant: MerchantSettings,
    pub gateway: GatewaySettings,
}

#[derive(Clone, serde::Deserialize, Debug)]
pub struct Common {
    pub environment: String,
}

impl Common {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        match self.environment.as_str() {
            "development" | "production" => Ok(()),
            _ => Err(config::ConfigError::Message(format!(
                "Invalid environment '{}'. Must be 'development' or 'production'",
                self.environment
            ))),
        }
    }
}

#[derive(Clone, serde::Deserialize, Debug)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, serde::Deserialize, Debug)]
pub struct MetricsServer {
    pub host: String,
    pub port: u16,
}

/// Merchant-facing settings: gateway credentials per environment and the
/// risk thresholds of the reversal policy.
#[derive(Clone, serde::Deserialize, Debug)]
pub struct MerchantSettings {
    pub live_mode: bool,
    /// Display name embedded in the order reference the gateway echoes back.
    pub store_name: String,
    pub production_app_id: String,
    pub production_app_key: String,
    pub sandbox_app_id: String,
    pub sandbox_app_key: String,
    #[serde(default)]
    pub avs_reject_codes: Vec<String>,
    #[serde(default)]
    pub cvn_reject_codes: Vec<String>,
    #[serde(default)]
    pub debug: bool,
}

impl MerchantSettings {
    /// The key for the active environment must be present; verification with
    /// an empty key would reject every notification and is a config error,
    /// not a runtime condition.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let (app_id, app_key) = if self.live_mode {
            (&self.production_app_id, &self.production_app_key)
        } else {
            (&self.sandbox_app_id, &self.sandbox_app_key)
        };
        if app_id.is_empty() || app_key.is_empty() {
            return Err(config::ConfigError::Message(format!(
                "Gateway credentials missing for the active ({}) environment",
                if self.live_mode { "production" } else { "sandbox" }
            )));
        }
        Ok(())
    }

    pub fn merchant_config(&self) -> MerchantConfig {
        MerchantConfig {
            live_mode: self.live_mode,
            production: GatewayCredential::new(
                self.production_app_id.clone(),
                self.production_app_key.clone(),
            ),
            sandbox: GatewayCredential::new(
                self.sandbox_app_id.clone(),
                self.sandbox_app_key.clone(),
            ),
            avs_reject_codes: self.avs_reject_codes.iter().cloned().collect(),
            cvn_reject_codes: self.cvn_reject_codes.iter().cloned().collect(),
            debug: self.debug,
        }
    }

    /// Credentials for the active environment, for the outbound client.
    pub fn active_credentials(&self) -> (String, String) {
        if self.live_mode {
            (
                self.production_app_id.clone(),
                self.production_app_key.clone(),
            )
        } else {
            (self.sandbox_app_id.clone(), self.sandbox_app_key.clone())
        }
    }
}

/// Gateway endpoints and the merchant-side URLs customers are sent to.
#[derive(Clone, serde::Deserialize, Debug)]
pub struct GatewaySettings {
    /// Base URL of the gateway's transaction API.
    pub api_base_url: String,
    /// Public base URL this service's callback routes are mounted under.
    pub callback_base_url: String,
    /// Storefront checkout page, target of cancellation redirects.
    pub checkout_url: String,
    /// Storefront order-received page, target of successful redirects.
    pub order_received_url: String,
}

impl Config {
    /// Function to build the configuration by picking it from default locations
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::new_with_config_path(None)
    }

    /// Function to build the configuration by picking it from default locations
    pub fn new_with_config_path(
        explicit_config_path: Option<PathBuf>,
    ) -> Result<Self, config::ConfigError> {
        let env = crate::consts::Env::current_env();
        let config_path = Self::config_path(&env, explicit_config_path);

        let config = Self::builder(&env)?
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("PRS")
                    .try_parsing(true)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("merchant.avs_reject_codes")
                    .with_list_parse_key("merchant.cvn_reject_codes"),
            )
            .build()?;

        #[allow(clippy::print_stderr)]
        let config: Self = serde_path_to_error::deserialize(config).map_err(|error| {
            eprintln!("Unable to deserialize application configuration: {error}");
            error.into_inner()
        })?;

        config.common.validate()?;
        config.merchant.validate()?;

        Ok(config)
    }

    pub fn builder(
        environment: &crate::consts::Env,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            // Here, it should be `set_override()` not `set_default()`.
            // "env" can't be altered by config field.
            // Should be single source of truth.
            .set_override("env", environment.to_string())
    }

    /// Config path.
    pub fn config_path(
        environment: &crate::consts::Env,
        explicit_config_path: Option<PathBuf>,
    ) -> PathBuf {
        let mut config_path = PathBuf::new();
        if let Some(explicit_config_path_val) = explicit_config_path {
            config_path.push(explicit_config_path_val);
        } else {
            let config_directory: String = "config".into();
            let config_file_name = environment.config_path();

            config_path.push(workspace_path());
            config_path.push(config_directory);
            config_path.push(config_file_name);
        }
        config_path
    }
}

impl Server {
    pub async fn tcp_listener(&self) -> Result<tokio::net::TcpListener, ConfigurationError> {
        let loc = format!("{}:{}", self.host, self.port);

        tracing::info!(loc = %loc, "binding the server");

        Ok(tokio::net::TcpListener::bind(loc).await?)
    }
}

impl MetricsServer {
    pub async fn tcp_listener(&self) -> Result<tokio::net::TcpListener, ConfigurationError> {
        let loc = format!("{}:{}", self.host, self.port);

        tracing::info!(loc = %loc, "binding the metrics server");

        Ok(tokio::net::TcpListener::bind(loc).await?)
    }
}

pub fn workspace_path() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let mut path = PathBuf::from(manifest_dir);
        path.pop();
        path.pop();
        path
    } else {
        PathBuf::from(".")
    }
}
