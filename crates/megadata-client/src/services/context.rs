//! Service context - dependency container for services
//!
//! Holds the backend gateways, the session store and the token decoder.

use chrono::Utc;
use std::sync::Arc;

use megadata_common::{AppResult, TokenDecoder};
use megadata_core::{RouteConstraint, Session};

use crate::gateways::{
    AuthGateway, HealthGateway, HttpAuthGateway, HttpHealthGateway, HttpMemberGateway,
    HttpPresenceAdminGateway, HttpPresenceGateway, HttpUserGateway, MemberGateway,
    PresenceAdminGateway, PresenceGateway, UserGateway,
};
use crate::http::ApiClient;
use crate::session::SessionStore;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the dependency container passed to every service. It provides
/// access to:
/// - Backend gateways
/// - The shared session store
/// - The bearer token decoder
#[derive(Clone)]
pub struct ServiceContext {
    // Gateways
    auth_gateway: Arc<dyn AuthGateway>,
    member_gateway: Arc<dyn MemberGateway>,
    user_gateway: Arc<dyn UserGateway>,
    presence_gateway: Arc<dyn PresenceGateway>,
    presence_admin_gateway: Arc<dyn PresenceAdminGateway>,
    health_gateway: Arc<dyn HealthGateway>,

    // Session
    session: SessionStore,
    token_decoder: Arc<TokenDecoder>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth_gateway: Arc<dyn AuthGateway>,
        member_gateway: Arc<dyn MemberGateway>,
        user_gateway: Arc<dyn UserGateway>,
        presence_gateway: Arc<dyn PresenceGateway>,
        presence_admin_gateway: Arc<dyn PresenceAdminGateway>,
        health_gateway: Arc<dyn HealthGateway>,
        session: SessionStore,
        token_decoder: Arc<TokenDecoder>,
    ) -> Self {
        Self {
            auth_gateway,
            member_gateway,
            user_gateway,
            presence_gateway,
            presence_admin_gateway,
            health_gateway,
            session,
            token_decoder,
        }
    }

    /// Wire every gateway to the REST backend behind `client`
    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(
            Arc::new(HttpAuthGateway::new(client.clone())),
            Arc::new(HttpMemberGateway::new(client.clone())),
            Arc::new(HttpUserGateway::new(client.clone())),
            Arc::new(HttpPresenceGateway::new(client.clone())),
            Arc::new(HttpPresenceAdminGateway::new(client.clone())),
            Arc::new(HttpHealthGateway::new(client.clone())),
            client.session().clone(),
            Arc::new(TokenDecoder::new()),
        )
    }

    /// Build the REST client and context from configuration
    pub fn connect(config: megadata_common::ApiConfig, session: SessionStore) -> AppResult<Self> {
        let client = ApiClient::new(config, session)?;
        Ok(Self::from_client(&client))
    }

    // === Gateways ===

    pub fn auth_gateway(&self) -> &dyn AuthGateway {
        self.auth_gateway.as_ref()
    }

    pub fn member_gateway(&self) -> &dyn MemberGateway {
        self.member_gateway.as_ref()
    }

    pub fn user_gateway(&self) -> &dyn UserGateway {
        self.user_gateway.as_ref()
    }

    pub fn presence_gateway(&self) -> &dyn PresenceGateway {
        self.presence_gateway.as_ref()
    }

    pub fn presence_admin_gateway(&self) -> &dyn PresenceAdminGateway {
        self.presence_admin_gateway.as_ref()
    }

    pub fn health_gateway(&self) -> &dyn HealthGateway {
        self.health_gateway.as_ref()
    }

    // === Session ===

    /// Get the session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Get the token decoder
    pub fn token_decoder(&self) -> &TokenDecoder {
        self.token_decoder.as_ref()
    }

    /// Current session, checked against `constraint` as of now
    ///
    /// # Errors
    /// `NoSession`/`SessionExpired` without a usable session (an expired
    /// or malformed one is purged), `Forbidden` on a role mismatch
    pub fn require(&self, constraint: RouteConstraint) -> ServiceResult<Session> {
        Ok(self.session.require(constraint, Utc::now().timestamp())?)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("gateways", &"...")
            .field("session", &self.session)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom gateways
#[derive(Default)]
pub struct ServiceContextBuilder {
    auth_gateway: Option<Arc<dyn AuthGateway>>,
    member_gateway: Option<Arc<dyn MemberGateway>>,
    user_gateway: Option<Arc<dyn UserGateway>>,
    presence_gateway: Option<Arc<dyn PresenceGateway>>,
    presence_admin_gateway: Option<Arc<dyn PresenceAdminGateway>>,
    health_gateway: Option<Arc<dyn HealthGateway>>,
    session: Option<SessionStore>,
    token_decoder: Option<Arc<TokenDecoder>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_gateway(mut self, gateway: Arc<dyn AuthGateway>) -> Self {
        self.auth_gateway = Some(gateway);
        self
    }

    pub fn member_gateway(mut self, gateway: Arc<dyn MemberGateway>) -> Self {
        self.member_gateway = Some(gateway);
        self
    }

    pub fn user_gateway(mut self, gateway: Arc<dyn UserGateway>) -> Self {
        self.user_gateway = Some(gateway);
        self
    }

    pub fn presence_gateway(mut self, gateway: Arc<dyn PresenceGateway>) -> Self {
        self.presence_gateway = Some(gateway);
        self
    }

    pub fn presence_admin_gateway(mut self, gateway: Arc<dyn PresenceAdminGateway>) -> Self {
        self.presence_admin_gateway = Some(gateway);
        self
    }

    pub fn health_gateway(mut self, gateway: Arc<dyn HealthGateway>) -> Self {
        self.health_gateway = Some(gateway);
        self
    }

    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    pub fn token_decoder(mut self, decoder: Arc<TokenDecoder>) -> Self {
        self.token_decoder = Some(decoder);
        self
    }

    /// Build the ServiceContext
    ///
    /// The token decoder defaults to [`TokenDecoder::new`].
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.auth_gateway.ok_or_else(|| ServiceError::validation("auth_gateway is required"))?,
            self.member_gateway.ok_or_else(|| ServiceError::validation("member_gateway is required"))?,
            self.user_gateway.ok_or_else(|| ServiceError::validation("user_gateway is required"))?,
            self.presence_gateway.ok_or_else(|| ServiceError::validation("presence_gateway is required"))?,
            self.presence_admin_gateway
                .ok_or_else(|| ServiceError::validation("presence_admin_gateway is required"))?,
            self.health_gateway.ok_or_else(|| ServiceError::validation("health_gateway is required"))?,
            self.session.ok_or_else(|| ServiceError::validation("session is required"))?,
            self.token_decoder.unwrap_or_else(|| Arc::new(TokenDecoder::new())),
        ))
    }
}
