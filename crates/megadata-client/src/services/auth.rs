//! Authentication service
//!
//! Handles login, registration, logout, profile lookups and in-place
//! session fixes. A successful login decodes the bearer token into a
//! [`Session`] and hands it to the shared session store.

use chrono::Utc;
use tracing::{info, instrument, warn};
use validator::Validate;

use megadata_common::AppError;
use megadata_core::{GuardDecision, RouteConstraint, Screen, Session, UserAccount};

use crate::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::gateways::AuthGrant;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Fields a forced session update may rewrite
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub username: Option<String>,
    pub assigned_service: Option<String>,
}

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Login with username (or phone) and password
    #[instrument(skip(self, request), fields(login = %request.login))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let grant = self
            .ctx
            .auth_gateway()
            .login(&request)
            .await
            .map_err(|e| match e {
                // The backend answers bad credentials with 401
                AppError::SessionExpired => {
                    warn!("Login failed: credentials rejected");
                    ServiceError::App(AppError::InvalidCredentials)
                }
                other => ServiceError::App(other),
            })?;

        self.open_session(grant)
    }

    /// Create an account and sign it in
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let grant = self.ctx.auth_gateway().register(&request).await?;
        info!(username = %request.username, "Account registered");
        self.open_session(grant)
    }

    /// Sign out; returns whether someone was signed in
    #[instrument(skip(self))]
    pub fn logout(&self) -> ServiceResult<bool> {
        Ok(self.ctx.session().clear()?)
    }

    /// Account behind the current session, as the backend sees it
    #[instrument(skip(self))]
    pub async fn profile(&self) -> ServiceResult<UserAccount> {
        self.require_session()?;
        Ok(self.ctx.auth_gateway().profile().await?)
    }

    /// Copy the assigned service from the profile into the session
    ///
    /// Tokens issued before a berger was assigned carry no service.
    #[instrument(skip(self))]
    pub async fn sync_profile(&self) -> ServiceResult<Session> {
        let profile = self.profile().await?;
        self.force_update_session(SessionUpdate {
            username: None,
            assigned_service: profile.assigned_service,
        })
    }

    /// Rewrite session fields in place and notify subscribers
    #[instrument(skip(self, update))]
    pub fn force_update_session(&self, update: SessionUpdate) -> ServiceResult<Session> {
        let session = self.ctx.session().update(|session| {
            if let Some(username) = update.username {
                session.username = username;
            }
            if update.assigned_service.is_some() {
                session.assigned_service = update.assigned_service;
            }
        })?;
        info!(user_id = %session.user_id, "Session updated in place");
        Ok(session)
    }

    /// Current session, if any
    pub fn current(&self) -> Option<Session> {
        self.ctx.session().current()
    }

    /// Decide whether the current session may open `screen`
    #[instrument(skip(self))]
    pub fn guard(&self, screen: Screen) -> ServiceResult<GuardDecision> {
        Ok(self.ctx.session().guard(screen, Utc::now().timestamp())?)
    }

    /// Decide access for a raw path such as `/admin/users`
    pub fn guard_path(&self, path: &str) -> ServiceResult<(Screen, GuardDecision)> {
        let screen = Screen::resolve(path);
        Ok((screen, self.guard(screen)?))
    }

    fn require_session(&self) -> ServiceResult<Session> {
        self.ctx.require(RouteConstraint::None)
    }

    fn open_session(&self, grant: AuthGrant) -> ServiceResult<AuthResponse> {
        let mut session = self.ctx.token_decoder().to_session(&grant.token)?;

        if session.assigned_service().is_none() {
            session.assigned_service = grant
                .account
                .as_ref()
                .and_then(|account| account.assigned_service.clone());
        }

        self.ctx.session().establish(session.clone())?;
        info!(user_id = %session.user_id, role = %session.role, "User logged in successfully");

        Ok(AuthResponse {
            home: Screen::home_for(session.role),
            session,
            account: grant.account,
        })
    }
}
