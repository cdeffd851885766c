//! Member service
//!
//! Roster listing, search, registration and removal of church members,
//! plus the dashboard statistics computed over a member list.

use chrono::Utc;
use tracing::{info, instrument, warn};

use megadata_core::{
    DomainError, Member, MemberId, MemberStats, NewMember, Role, RouteConstraint, Session,
};

use crate::dto::CreateMemberRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Member service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    /// Create a new MemberService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Members registered under the signed-in account's service
    #[instrument(skip(self))]
    pub async fn my_members(&self) -> ServiceResult<Vec<Member>> {
        self.ctx.require(RouteConstraint::None)?;
        Ok(self.ctx.member_gateway().my_members().await?)
    }

    /// Every member (admin only)
    #[instrument(skip(self))]
    pub async fn all_members(&self) -> ServiceResult<Vec<Member>> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        Ok(self.ctx.member_gateway().all_members().await?)
    }

    /// Members visible to the session: everyone for admins, the own roster otherwise
    #[instrument(skip(self))]
    pub async fn visible_members(&self) -> ServiceResult<Vec<Member>> {
        let session = self.ctx.require(RouteConstraint::None)?;
        let members = if session.role.is_admin() {
            self.ctx.member_gateway().all_members().await?
        } else {
            self.ctx.member_gateway().my_members().await?
        };
        Ok(members)
    }

    /// Search by free text and/or service; blank filters are dropped
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: Option<&str>,
        service: Option<&str>,
    ) -> ServiceResult<Vec<Member>> {
        self.ctx.require(RouteConstraint::None)?;
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let service = service.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.ctx.member_gateway().search(query, service).await?)
    }

    /// Register a new member
    ///
    /// Administrators cannot register members. A berger may only register
    /// into their assigned service; a blank service on the form defaults to it.
    #[instrument(skip(self, form), fields(service = %form.service))]
    pub async fn register(&self, form: NewMember) -> ServiceResult<Option<Member>> {
        let session = self.ctx.require(RouteConstraint::None)?;
        let form = registration_form(&session, form)?.normalized()?;

        let request = CreateMemberRequest::from(&form);
        let created = self.ctx.member_gateway().create(&request).await?;

        match &created {
            Some(member) => info!(member_id = %member.id, "Member registered"),
            None => warn!("Member registered but not echoed back"),
        }
        Ok(created)
    }

    /// Remove a member (admin only)
    #[instrument(skip(self))]
    pub async fn delete(&self, id: MemberId) -> ServiceResult<()> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        self.ctx.member_gateway().delete(id).await?;
        info!(member_id = %id, "Member deleted");
        Ok(())
    }

    /// Dashboard statistics over the members visible to the session
    #[instrument(skip(self))]
    pub async fn stats(&self) -> ServiceResult<MemberStats> {
        let members = self.visible_members().await?;
        Ok(MemberStats::compute(&members, Utc::now()))
    }
}

/// Apply the role rules to a registration form
fn registration_form(session: &Session, mut form: NewMember) -> ServiceResult<NewMember> {
    match session.role {
        Role::Admin | Role::SuperAdmin => Err(DomainError::AdminCannotRegister.into()),
        Role::Berger => {
            let assigned = session
                .assigned_service()
                .ok_or(DomainError::MissingAssignedService)?;
            if form.service.trim().is_empty() {
                form.service = assigned.to_string();
            } else if form.service.trim() != assigned {
                return Err(ServiceError::Domain(DomainError::ServiceMismatch {
                    expected: assigned.to_string(),
                }));
            }
            Ok(form)
        }
        Role::Member => Ok(form),
    }
}
