pub mod auth_retry;
pub mod client;
pub mod credentials;
pub mod http_transport;
pub mod page_stream;
pub mod pagination;
pub mod routing;

pub use crate::domain::model::{Endpoint, ModuleId, OcpiResponse, PageCursor, Record, Session};
pub use crate::domain::ports::{OcpiRequest, Transport, TransportOutcome};
pub use crate::utils::error::Result;
