//! REST implementation of PresenceGateway

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::instrument;

use megadata_common::AppResult;
use megadata_core::AttendanceRecord;

use crate::dto::mappers::presence_record;
use crate::dto::wire::{Ack, DailyStatsPayload, PresenceByDatePayload};
use crate::dto::{DailyAttendance, MarkAllRequest, RecordPresenceRequest};
use crate::gateways::traits::PresenceGateway;
use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct HttpPresenceGateway {
    client: ApiClient,
}

impl HttpPresenceGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PresenceGateway for HttpPresenceGateway {
    #[instrument(skip(self))]
    async fn records_for(&self, date: NaiveDate) -> AppResult<Vec<AttendanceRecord>> {
        let envelope = self
            .client
            .get::<PresenceByDatePayload>(&format!("/presence/date/{date}"))
            .await?;
        Ok(envelope
            .data
            .membres
            .into_iter()
            .filter_map(|entry| presence_record(entry, date))
            .collect())
    }

    #[instrument(skip(self, request), fields(member_id = %request.membre_id, date = %request.date))]
    async fn record(&self, request: &RecordPresenceRequest) -> AppResult<()> {
        self.client
            .post::<Ack, _>("/presence/record", request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_all_present(&self, date: NaiveDate) -> AppResult<Option<String>> {
        let envelope = self
            .client
            .post::<Ack, _>("/presence/mark-all", &MarkAllRequest { date })
            .await?;
        Ok(envelope.message)
    }

    #[instrument(skip(self))]
    async fn stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyAttendance>> {
        let params = [("startDate", start.to_string()), ("endDate", end.to_string())];
        let envelope = self
            .client
            .get_with_query::<DailyStatsPayload, _>("/presence/stats", &params)
            .await?;
        Ok(envelope.data.stats.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn report(&self, date: NaiveDate) -> AppResult<serde_json::Value> {
        let envelope = self
            .client
            .get::<serde_json::Value>(&format!("/presence/report/{date}"))
            .await?;
        Ok(envelope.data)
    }
}
