use crate::core::auth_retry::AuthRetryOrchestrator;
use crate::core::http_transport::HttpTransport;
use crate::core::page_stream::PageStream;
use crate::core::routing::RoutingParties;
use crate::domain::model::{Endpoint, ModuleId, OcpiResponse, Record, Session};
use crate::domain::ports::{OcpiRequest, Transport};
use crate::utils::error::{OcpiError, Result};
use reqwest::Method;
use std::sync::Arc;

/// OCPI client bound to one session. Every call goes through the
/// token-encoding fallback in [`AuthRetryOrchestrator`].
#[derive(Debug, Clone)]
pub struct OcpiClient<T: Transport = HttpTransport> {
    session: Arc<Session>,
    orchestrator: AuthRetryOrchestrator<T>,
}

impl OcpiClient<HttpTransport> {
    pub fn new(session: impl Into<Arc<Session>>) -> Self {
        Self::with_transport(session, HttpTransport::new())
    }
}

impl<T: Transport> OcpiClient<T> {
    pub fn with_transport(session: impl Into<Arc<Session>>, transport: T) -> Self {
        Self {
            session: session.into(),
            orchestrator: AuthRetryOrchestrator::new(transport),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        self.orchestrator.transport()
    }

    pub fn resolve(&self, module: ModuleId) -> Result<&Endpoint> {
        self.session
            .endpoint_for(module)
            .ok_or(OcpiError::ModuleNotServed { module })
    }

    pub async fn request(&self, request: &OcpiRequest) -> Result<OcpiResponse> {
        let response = self
            .orchestrator
            .execute(&self.session.token, &self.session.version, request)
            .await?;

        if !response.is_success() {
            tracing::warn!(
                url = %request.url,
                status_code = response.status_code,
                status_message = response.status_message.as_deref().unwrap_or(""),
                "⚠️ Platform reported a non-success OCPI status"
            );
        }

        Ok(response)
    }

    pub fn stream(&self, module: ModuleId, routing: RoutingParties) -> PageStream<'_, T> {
        PageStream::new(self, module, routing)
    }

    pub async fn get_object(
        &self,
        module: ModuleId,
        path: &str,
        routing: &RoutingParties,
    ) -> Result<OcpiResponse> {
        let request = self.object_request(Method::GET, module, path, routing)?;
        self.request(&request).await
    }

    pub async fn send_object(
        &self,
        method: Method,
        module: ModuleId,
        path: &str,
        body: Record,
        routing: &RoutingParties,
    ) -> Result<OcpiResponse> {
        let request = self
            .object_request(method, module, path, routing)?
            .with_body(body);
        self.request(&request).await
    }

    pub async fn put_object(
        &self,
        module: ModuleId,
        path: &str,
        body: Record,
        routing: &RoutingParties,
    ) -> Result<OcpiResponse> {
        self.send_object(Method::PUT, module, path, body, routing)
            .await
    }

    pub async fn post_object(
        &self,
        module: ModuleId,
        path: &str,
        body: Record,
        routing: &RoutingParties,
    ) -> Result<OcpiResponse> {
        self.send_object(Method::POST, module, path, body, routing)
            .await
    }

    pub async fn delete_object(
        &self,
        module: ModuleId,
        path: &str,
        routing: &RoutingParties,
    ) -> Result<OcpiResponse> {
        let request = self.object_request(Method::DELETE, module, path, routing)?;
        self.request(&request).await
    }

    /// 路由標頭先驗證，失敗時不會發出任何請求
    fn object_request(
        &self,
        method: Method,
        module: ModuleId,
        path: &str,
        routing: &RoutingParties,
    ) -> Result<OcpiRequest> {
        let headers = routing.headers()?;
        let endpoint = self.resolve(module)?;
        Ok(OcpiRequest::new(method, object_url(&endpoint.url, path)).with_routing(headers))
    }
}

fn object_url(base: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}
