//! REST implementation of PresenceAdminGateway

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::instrument;

use megadata_common::AppResult;
use megadata_core::MemberId;

use crate::dto::mappers::presence_overview;
use crate::dto::wire::{AdminPresencePayload, HistoryPayload, ServiceStatsPayload};
use crate::dto::{PresenceHistoryEntry, PresenceOverview, ServiceAttendance};
use crate::gateways::traits::PresenceAdminGateway;
use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct HttpPresenceAdminGateway {
    client: ApiClient,
}

impl HttpPresenceAdminGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PresenceAdminGateway for HttpPresenceAdminGateway {
    #[instrument(skip(self))]
    async fn by_date(&self, date: NaiveDate, service: Option<&str>) -> AppResult<PresenceOverview> {
        let path = format!("/admin/presence/date/{date}");
        let envelope = match service {
            Some(service) => {
                self.client
                    .get_with_query::<AdminPresencePayload, _>(&path, &[("service", service)])
                    .await?
            }
            None => self.client.get::<AdminPresencePayload>(&path).await?,
        };
        Ok(presence_overview(
            envelope.data,
            date,
            service.map(str::to_string),
        ))
    }

    #[instrument(skip(self))]
    async fn member_history(&self, id: MemberId) -> AppResult<Vec<PresenceHistoryEntry>> {
        let envelope = self
            .client
            .get::<HistoryPayload>(&format!("/admin/presence/member/{id}"))
            .await?;
        Ok(envelope.data.data.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn stats_by_service(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<ServiceAttendance>> {
        let params = [("startDate", start.to_string()), ("endDate", end.to_string())];
        let envelope = self
            .client
            .get_with_query::<ServiceStatsPayload, _>("/admin/presence/stats/service", &params)
            .await?;
        Ok(envelope.data.stats.into_iter().map(Into::into).collect())
    }
}
