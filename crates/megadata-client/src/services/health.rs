//! Backend reachability check

use tracing::{instrument, warn};

use crate::dto::HealthStatus;

use super::context::ServiceContext;

pub struct HealthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> HealthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Probe the backend; never fails, an unreachable backend reports offline
    #[instrument(skip(self))]
    pub async fn check(&self) -> HealthStatus {
        let status = self.ctx.health_gateway().health().await;
        if !status.online {
            warn!(base_url = %status.base_url, error = ?status.error, "Backend unreachable");
        }
        status
    }
}
