//! Test helpers for integration tests
//!
//! Spawns the fake backend on an ephemeral port and wires the real
//! `reqwest`-based client to it.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use megadata_client::{FileSessionStorage, ServiceContext, SessionStorage, SessionStore};
use megadata_common::ApiConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::backend::{router, BackendState};
use crate::fixtures::{self, Account};

/// Fake backend instance that manages its lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start with the default accounts and roster
    pub async fn start() -> Result<Self> {
        let accounts = vec![
            fixtures::admin(),
            fixtures::berger(),
            fixtures::member_account(),
        ];
        Self::start_with(BackendState::seeded(accounts, fixtures::roster())).await
    }

    pub async fn start_with(state: Arc<BackendState>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_config(&self) -> ApiConfig {
        api_config(&self.base_url())
    }

    /// Client context with an in-memory session store
    pub fn context(&self) -> Result<ServiceContext> {
        Ok(ServiceContext::connect(self.api_config(), SessionStore::in_memory())?)
    }

    /// Client context whose session lives in `path`
    pub fn context_with_file(&self, path: &Path) -> Result<ServiceContext> {
        let storage: Arc<dyn SessionStorage> = Arc::new(FileSessionStorage::new(path));
        let session = SessionStore::new(storage);
        session.restore()?;
        Ok(ServiceContext::connect(self.api_config(), session)?)
    }

    /// Client context already signed in as `account`
    pub fn signed_in(&self, account: &Account) -> Result<ServiceContext> {
        let ctx = self.context()?;
        let session = ctx
            .token_decoder()
            .to_session(&account.token(fixtures::FAR_FUTURE))?;
        ctx.session().establish(session)?;
        Ok(ctx)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// API settings pointing at `base_url`, with short timeouts
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        health_timeout_secs: 2,
    }
}
