use crate::core::pagination::next_cursor;
use crate::domain::model::OcpiResponse;
use crate::domain::ports::{OcpiRequest, Transport, TransportOutcome};
use crate::utils::error::{OcpiError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION, LINK};
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";
pub const LIMIT_HEADER: &str = "X-Limit";

/// `reqwest` 實作的 OCPI 傳輸層，每次呼叫一個 round trip，不自行重試
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn invoke(&self, request: &OcpiRequest, authorization: &str) -> TransportOutcome {
        let request_id = Uuid::new_v4().to_string();
        let correlation_id = Uuid::new_v4().to_string();

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header(AUTHORIZATION, authorization)
            .header(REQUEST_ID_HEADER, &request_id)
            .header(CORRELATION_ID_HEADER, &correlation_id);

        for (name, value) in &request.routing {
            builder = builder.header(*name, value);
        }

        if let Some(cursor) = request.cursor {
            builder = builder.query(&[
                ("offset", cursor.offset.to_string()),
                ("limit", cursor.limit.to_string()),
            ]);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            request_id = %request_id,
            correlation_id = %correlation_id,
            "📡 Sending OCPI request"
        );

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "OCPI request did not reach the platform");
                return TransportOutcome::ConnectionFailure { cause: e.into() };
            }
        };

        let status = response.status();
        tracing::debug!(request_id = %request_id, %status, "OCPI response received");

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(request_id = %request_id, %status, error = %e, "Could not read error response body");
                    String::new()
                }
            };
            return TransportOutcome::TransportFailure {
                status: status.as_u16(),
                body,
            };
        }

        let headers = response.headers().clone();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return TransportOutcome::ConnectionFailure { cause: e.into() },
        };

        match serde_json::from_slice::<OcpiResponse>(&bytes) {
            Ok(mut envelope) => {
                envelope.next = next_cursor(link_header(&headers).as_deref());
                envelope.total_count = numeric_header(&headers, TOTAL_COUNT_HEADER);
                envelope.limit = numeric_header(&headers, LIMIT_HEADER);
                TransportOutcome::Success(envelope)
            }
            Err(e) => TransportOutcome::ConnectionFailure {
                cause: OcpiError::Decode {
                    message: e.to_string(),
                },
            },
        }
    }
}

/// 多個 Link 標頭合併成一個以逗號分隔的值
fn link_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

fn numeric_header<N: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<N> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
