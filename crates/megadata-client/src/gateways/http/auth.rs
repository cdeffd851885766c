//! REST implementation of AuthGateway

use async_trait::async_trait;
use tracing::instrument;

use megadata_common::AppResult;
use megadata_core::UserAccount;

use crate::dto::wire::{AuthPayload, ProfilePayload};
use crate::dto::{LoginRequest, RegisterRequest};
use crate::gateways::traits::{AuthGateway, AuthGrant};
use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: ApiClient,
}

impl HttpAuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn grant(payload: AuthPayload) -> AppResult<AuthGrant> {
    Ok(AuthGrant {
        token: payload.token,
        account: payload.user.map(UserAccount::try_from).transpose()?,
    })
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    #[instrument(skip(self, request), fields(login = %request.login))]
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthGrant> {
        let envelope = self.client.post::<AuthPayload, _>("/auth/login", request).await?;
        grant(envelope.data)
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn register(&self, request: &RegisterRequest) -> AppResult<AuthGrant> {
        let envelope = self
            .client
            .post::<AuthPayload, _>("/auth/register", request)
            .await?;
        grant(envelope.data)
    }

    #[instrument(skip(self))]
    async fn profile(&self) -> AppResult<UserAccount> {
        let envelope = self.client.get::<ProfilePayload>("/auth/profile").await?;
        UserAccount::try_from(envelope.data.user)
    }
}
