use crate::core::credentials::{authorization_header, prefers_encoded};
use crate::domain::model::OcpiResponse;
use crate::domain::ports::{OcpiRequest, Transport, TransportOutcome};
use crate::utils::error::{OcpiError, Result};

/// Which token presentation an attempt uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAttempt {
    /// Version-preferred encoding.
    First { encoded: bool },
    /// Opposite encoding, taken once after a 4xx on the first attempt.
    Retry { encoded: bool },
}

impl AuthAttempt {
    fn encoded(&self) -> bool {
        match self {
            AuthAttempt::First { encoded } | AuthAttempt::Retry { encoded } => *encoded,
        }
    }
}

/// OCPI 各版本的 token 編碼規則不一，且有平台不照規範實作：
/// 先用版本偏好的編碼，收到 4xx 時換另一種編碼再試一次
#[derive(Debug, Clone)]
pub struct AuthRetryOrchestrator<T: Transport> {
    transport: T,
}

impl<T: Transport> AuthRetryOrchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn execute(
        &self,
        token: &str,
        version: &str,
        request: &OcpiRequest,
    ) -> Result<OcpiResponse> {
        let mut attempt = AuthAttempt::First {
            encoded: prefers_encoded(version),
        };

        loop {
            let authorization = authorization_header(token, attempt.encoded());
            let outcome = self.transport.invoke(request, &authorization).await;

            match (attempt, outcome) {
                (_, TransportOutcome::Success(response)) => return Ok(response),
                (AuthAttempt::First { encoded }, TransportOutcome::TransportFailure { status, .. })
                    if (400..500).contains(&status) =>
                {
                    tracing::info!(
                        url = %request.url,
                        status,
                        "🔑 Platform answered {}, retrying with {} token",
                        status,
                        if encoded { "plain" } else { "base64-encoded" }
                    );
                    attempt = AuthAttempt::Retry { encoded: !encoded };
                }
                (_, TransportOutcome::TransportFailure { status, body }) => {
                    tracing::debug!(url = %request.url, status, ?attempt, "OCPI request failed");
                    return Err(OcpiError::Http { status, body });
                }
                (_, TransportOutcome::ConnectionFailure { cause }) => return Err(cause),
            }
        }
    }
}
