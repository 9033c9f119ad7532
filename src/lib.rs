pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::SessionFile;
pub use crate::core::{
    client::OcpiClient,
    http_transport::HttpTransport,
    page_stream::{PageBatch, PageStream, StreamState},
    routing::RoutingParties,
};
pub use domain::model::{Endpoint, InterfaceRole, ModuleId, OcpiResponse, PageCursor, Session};
pub use utils::error::{OcpiError, Result};
