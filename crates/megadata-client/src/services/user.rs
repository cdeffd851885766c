//! User service
//!
//! Account administration: listing accounts, changing roles and removing
//! accounts. Every operation is restricted to administrators.

use tracing::{info, instrument};

use megadata_core::{Role, RoleBreakdown, RouteConstraint, UserAccount, UserId};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// All login accounts
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<UserAccount>> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        Ok(self.ctx.user_gateway().list().await?)
    }

    /// Head count per role
    #[instrument(skip(self))]
    pub async fn breakdown(&self) -> ServiceResult<RoleBreakdown> {
        let accounts = self.list().await?;
        Ok(RoleBreakdown::from_accounts(&accounts))
    }

    /// Change an account's role
    #[instrument(skip(self))]
    pub async fn set_role(&self, id: UserId, role: Role) -> ServiceResult<()> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        self.ctx.user_gateway().set_role(id, role).await?;
        info!(user_id = %id, role = %role, "Role updated");
        Ok(())
    }

    /// Remove an account
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> ServiceResult<()> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        self.ctx.user_gateway().delete(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
