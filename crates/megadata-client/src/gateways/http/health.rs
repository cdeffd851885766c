//! REST implementation of HealthGateway

use async_trait::async_trait;

use crate::dto::HealthStatus;
use crate::gateways::traits::HealthGateway;
use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct HttpHealthGateway {
    client: ApiClient,
}

impl HttpHealthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthGateway for HttpHealthGateway {
    async fn health(&self) -> HealthStatus {
        self.client.health().await
    }
}
