pub mod doctor;
pub mod forecast;
pub mod migrate;
pub mod optimize;
pub mod seed;

use pricecast_core::config::{AppConfig, LoadOptions};
use pricecast_core::errors::PipelineError;
use pricecast_core::pipeline::RunStatus;
use pricecast_core::store::StoreError;
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::init_logging;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::completed(command, RunStatus::Ok, message)
    }

    /// Exit code stays 0 for partial runs; the status field carries the difference.
    pub fn completed(command: &str, status: RunStatus, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.as_str().to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn from_pipeline(command: &str, error: &PipelineError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    fn from_store(command: &str, error: &StoreError) -> Self {
        Self::failure(command, "store_access", format!("product store unavailable: {error}"), 4)
    }
}

/// Loads and validates config, then starts logging with its settings.
fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })?;
    init_logging(&config.logging);
    Ok(config)
}

fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
