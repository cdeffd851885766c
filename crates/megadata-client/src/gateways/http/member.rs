//! REST implementation of MemberGateway

use async_trait::async_trait;
use tracing::instrument;

use megadata_common::AppResult;
use megadata_core::{Member, MemberId};

use crate::dto::wire::{Ack, MemberPayload, MembersPayload};
use crate::dto::CreateMemberRequest;
use crate::gateways::traits::MemberGateway;
use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct HttpMemberGateway {
    client: ApiClient,
}

impl HttpMemberGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn fetch(&self, path: &str) -> AppResult<Vec<Member>> {
        let envelope = self.client.get::<MembersPayload>(path).await?;
        Ok(envelope.data.membres.into_iter().map(Member::from).collect())
    }
}

#[async_trait]
impl MemberGateway for HttpMemberGateway {
    #[instrument(skip(self))]
    async fn my_members(&self) -> AppResult<Vec<Member>> {
        self.fetch("/members/my-members").await
    }

    #[instrument(skip(self))]
    async fn all_members(&self) -> AppResult<Vec<Member>> {
        self.fetch("/members/all").await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: Option<&str>, service: Option<&str>) -> AppResult<Vec<Member>> {
        let mut params = Vec::with_capacity(2);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            params.push(("query", query));
        }
        if let Some(service) = service.filter(|s| !s.is_empty()) {
            params.push(("service", service));
        }

        let envelope = self
            .client
            .get_with_query::<MembersPayload, _>("/members/search", &params)
            .await?;
        Ok(envelope.data.membres.into_iter().map(Member::from).collect())
    }

    #[instrument(skip(self, request), fields(service = %request.service))]
    async fn create(&self, request: &CreateMemberRequest) -> AppResult<Option<Member>> {
        let envelope = self
            .client
            .post::<MemberPayload, _>("/members", request)
            .await?;
        Ok(envelope.data.member.map(Member::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: MemberId) -> AppResult<()> {
        self.client.delete::<Ack>(&format!("/members/{id}")).await?;
        Ok(())
    }
}
