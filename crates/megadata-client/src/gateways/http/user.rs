//! REST implementation of UserGateway

use async_trait::async_trait;
use tracing::{instrument, warn};

use megadata_common::AppResult;
use megadata_core::{Role, UserAccount, UserId};

use crate::dto::wire::{Ack, UsersPayload};
use crate::dto::UpdateRoleRequest;
use crate::gateways::traits::UserGateway;
use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct HttpUserGateway {
    client: ApiClient,
}

impl HttpUserGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserGateway for HttpUserGateway {
    #[instrument(skip(self))]
    async fn list(&self) -> AppResult<Vec<UserAccount>> {
        let envelope = self.client.get::<UsersPayload>("/members/users").await?;

        // One account with an unknown role must not hide the others
        let accounts = envelope
            .data
            .users
            .into_iter()
            .filter_map(|model| {
                let id = model.id;
                UserAccount::try_from(model)
                    .map_err(|e| warn!(user_id = %id, error = %e, "Skipping account"))
                    .ok()
            })
            .collect();
        Ok(accounts)
    }

    #[instrument(skip(self))]
    async fn set_role(&self, id: UserId, role: Role) -> AppResult<()> {
        self.client
            .put::<Ack, _>(
                &format!("/members/users/{id}/role"),
                &UpdateRoleRequest { role },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: UserId) -> AppResult<()> {
        self.client
            .delete::<Ack>(&format!("/members/users/{id}"))
            .await?;
        Ok(())
    }
}
