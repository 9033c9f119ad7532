use crate::domain::model::{OcpiResponse, PageCursor, Record};
use crate::utils::error::OcpiError;
use async_trait::async_trait;
use reqwest::Method;
use std::collections::BTreeMap;

/// Header name → value, at most one pair per routing side.
pub type RoutingHeaders = BTreeMap<&'static str, String>;

#[derive(Debug, Clone)]
pub struct OcpiRequest {
    pub method: Method,
    pub url: String,
    pub routing: RoutingHeaders,
    pub cursor: Option<PageCursor>,
    pub body: Option<Record>,
}

impl OcpiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            routing: RoutingHeaders::new(),
            cursor: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_routing(mut self, routing: RoutingHeaders) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_cursor(mut self, cursor: PageCursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_body(mut self, body: Record) -> Self {
        self.body = Some(body);
        self
    }
}

/// 單次 HTTP 呼叫的結果，以標籤區分而非檢查錯誤型別
#[derive(Debug)]
pub enum TransportOutcome {
    Success(OcpiResponse),
    /// The server answered with a non-success HTTP status.
    TransportFailure { status: u16, body: String },
    /// No usable response: connect/DNS failure, unreadable or undecodable body.
    ConnectionFailure { cause: OcpiError },
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs exactly one network round trip with the given `Authorization` value.
    async fn invoke(&self, request: &OcpiRequest, authorization: &str) -> TransportOutcome;
}
