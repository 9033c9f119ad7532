use crate::core::routing::RoutingParties;
use crate::domain::model::ModuleId;
use crate::utils::error::{OcpiError, Result};
use crate::utils::validation::{validate_party_id, validate_positive_number, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ocpi")]
#[command(about = "Query and update OCPI modules of a remote platform")]
pub struct CliConfig {
    #[arg(long, env = "OCPI_SESSION", default_value = "ocpi-session.json", global = true)]
    pub session: PathBuf,

    #[arg(long, help = "Sender party identifier, e.g. NLABC", global = true)]
    pub from: Option<String>,

    #[arg(long, help = "Receiver party identifier, e.g. DEXYZ", global = true)]
    pub to: Option<String>,

    #[arg(long, help = "Per-request timeout applied by the HTTP client", global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output", global = true)]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Stream every object of a module as JSON lines
    List {
        module: ModuleId,
        #[arg(long, default_value = "50", help = "Page size requested from the platform")]
        limit: u32,
        #[arg(long, help = "Stop after this many objects")]
        max: Option<usize>,
    },
    /// Fetch a single object
    Get { module: ModuleId, path: String },
    /// Replace an object with a JSON document
    Put {
        module: ModuleId,
        path: String,
        #[arg(long)]
        data: String,
    },
    /// Post a JSON document to a module
    Post {
        module: ModuleId,
        path: String,
        #[arg(long)]
        data: String,
    },
    /// Delete an object
    Delete { module: ModuleId, path: String },
    /// Show the endpoints stored in the session
    Endpoints,
}

impl CliConfig {
    pub fn routing(&self) -> RoutingParties {
        RoutingParties::new(self.from.clone(), self.to.clone())
    }

    /// `put`/`post` 的 `--data` 解析成 JSON
    pub fn payload(&self) -> Result<Option<serde_json::Value>> {
        match &self.command {
            Command::Put { data, .. } | Command::Post { data, .. } => {
                let value = serde_json::from_str(data).map_err(|e| OcpiError::InvalidConfigValueError {
                    field: "data".to_string(),
                    value: data.clone(),
                    reason: format!("Not a JSON document: {}", e),
                })?;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(from) = &self.from {
            validate_party_id("from", from)?;
        }
        if let Some(to) = &self.to {
            validate_party_id("to", to)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        if let Command::List { limit, max, .. } = &self.command {
            validate_positive_number("limit", u64::from(*limit), 1)?;
            if let Some(max) = max {
                validate_positive_number("max", *max as u64, 1)?;
            }
        }
        self.payload()?;
        Ok(())
    }
}
