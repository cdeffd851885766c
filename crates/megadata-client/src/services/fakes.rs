//! In-memory gateways for service tests

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use megadata_common::{AppError, AppResult};
use megadata_core::{
    AttendanceRecord, Member, MemberId, Role, Session, UserAccount, UserId,
};

use crate::dto::{
    CreateMemberRequest, DailyAttendance, HealthStatus, LoginRequest, PresenceHistoryEntry,
    PresenceOverview, PresenceSheetRow, RecordPresenceRequest, RegisterRequest, ServiceAttendance,
};
use crate::gateways::{
    AuthGateway, AuthGrant, HealthGateway, MemberGateway, PresenceAdminGateway, PresenceGateway,
    UserGateway,
};
use crate::session::SessionStore;

use super::context::{ServiceContext, ServiceContextBuilder};

pub const FAR_FUTURE: i64 = 4_000_000_000;

/// Token carrying the given identity, signed with a key the client never checks
pub fn token(id: i64, username: &str, role: &str, service: Option<&str>, exp: i64) -> String {
    let mut claims = serde_json::json!({
        "id": id,
        "username": username,
        "role": role,
        "exp": exp,
    });
    if let Some(service) = service {
        claims["serviceAssigne"] = service.into();
    }
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend-secret")).unwrap()
}

pub fn session(role: Role, service: Option<&str>) -> Session {
    Session::new(
        UserId::new(7),
        "ruth",
        role,
        service.map(str::to_string),
        FAR_FUTURE,
        "tok",
    )
}

pub fn member(id: i64, last_name: &str, service: &str) -> Member {
    Member {
        id: MemberId::new(id),
        last_name: last_name.to_string(),
        first_name: "Grace".to_string(),
        phone: "0810000000".to_string(),
        neighborhood: "Lemba".to_string(),
        service: service.to_string(),
        registered_by: Some(UserId::new(7)),
        registered_by_username: None,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
    }
}

pub fn account(id: i64, username: &str, role: Role) -> UserAccount {
    UserAccount {
        id: UserId::new(id),
        username: username.to_string(),
        first_name: None,
        last_name: None,
        branch: None,
        role,
        assigned_service: None,
        created_at: None,
    }
}

/// Scriptable stand-in for the whole backend
#[derive(Default)]
pub struct FakeBackend {
    pub grant_token: Mutex<Option<String>>,
    pub grant_account: Mutex<Option<UserAccount>>,
    pub reject_login: AtomicBool,
    pub profile: Mutex<Option<UserAccount>>,

    pub members: Mutex<Vec<Member>>,
    pub created: Mutex<Vec<CreateMemberRequest>>,
    pub deleted_members: Mutex<Vec<MemberId>>,
    pub fail_roster: AtomicBool,

    pub users: Mutex<Vec<UserAccount>>,
    pub role_changes: Mutex<Vec<(UserId, Role)>>,
    pub deleted_users: Mutex<Vec<UserId>>,

    pub records: Mutex<Vec<AttendanceRecord>>,
    pub fail_records: AtomicBool,
    pub saved: Mutex<Vec<RecordPresenceRequest>>,
    pub failing_saves: Mutex<HashSet<MemberId>>,
    pub mark_all_calls: Mutex<Vec<NaiveDate>>,
    pub stats_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,

    pub overview_services: Mutex<Vec<Option<String>>>,
    pub overview_rows: Mutex<Vec<PresenceSheetRow>>,
    pub history: Mutex<Vec<PresenceHistoryEntry>>,
    pub service_stats: Mutex<Vec<ServiceAttendance>>,

    pub online: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Context whose session store already holds `session`
    pub fn context(self: &Arc<Self>, session: Option<Session>) -> ServiceContext {
        let store = SessionStore::in_memory();
        if let Some(session) = session {
            store.establish(session).unwrap();
        }
        ServiceContextBuilder::new()
            .auth_gateway(self.clone())
            .member_gateway(self.clone())
            .user_gateway(self.clone())
            .presence_gateway(self.clone())
            .presence_admin_gateway(self.clone())
            .health_gateway(self.clone())
            .session(store)
            .build()
            .unwrap()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn grant(&self) -> AppResult<AuthGrant> {
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(AppError::SessionExpired);
        }
        let token = self.grant_token.lock().clone().ok_or(AppError::InvalidCredentials)?;
        Ok(AuthGrant {
            token,
            account: self.grant_account.lock().clone(),
        })
    }
}

#[async_trait]
impl AuthGateway for FakeBackend {
    async fn login(&self, _request: &LoginRequest) -> AppResult<AuthGrant> {
        self.hit();
        self.grant()
    }

    async fn register(&self, _request: &RegisterRequest) -> AppResult<AuthGrant> {
        self.hit();
        self.grant()
    }

    async fn profile(&self) -> AppResult<UserAccount> {
        self.hit();
        self.profile.lock().clone().ok_or(AppError::SessionExpired)
    }
}

#[async_trait]
impl MemberGateway for FakeBackend {
    async fn my_members(&self) -> AppResult<Vec<Member>> {
        self.hit();
        if self.fail_roster.load(Ordering::SeqCst) {
            return Err(AppError::Server { status: 500 });
        }
        Ok(self.members.lock().clone())
    }

    async fn all_members(&self) -> AppResult<Vec<Member>> {
        self.hit();
        Ok(self.members.lock().clone())
    }

    async fn search(&self, query: Option<&str>, service: Option<&str>) -> AppResult<Vec<Member>> {
        self.hit();
        let query = query.map(str::to_lowercase);
        Ok(self
            .members
            .lock()
            .iter()
            .filter(|m| service.map_or(true, |s| m.service == s))
            .filter(|m| {
                query
                    .as_deref()
                    .map_or(true, |q| m.full_name().to_lowercase().contains(q))
            })
            .cloned()
            .collect())
    }

    async fn create(&self, request: &CreateMemberRequest) -> AppResult<Option<Member>> {
        self.hit();
        self.created.lock().push(request.clone());
        let mut created = member(100, &request.nom, &request.service);
        created.first_name.clone_from(&request.prenom);
        Ok(Some(created))
    }

    async fn delete(&self, id: MemberId) -> AppResult<()> {
        self.hit();
        self.deleted_members.lock().push(id);
        Ok(())
    }
}

#[async_trait]
impl UserGateway for FakeBackend {
    async fn list(&self) -> AppResult<Vec<UserAccount>> {
        self.hit();
        Ok(self.users.lock().clone())
    }

    async fn set_role(&self, id: UserId, role: Role) -> AppResult<()> {
        self.hit();
        self.role_changes.lock().push((id, role));
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AppResult<()> {
        self.hit();
        self.deleted_users.lock().push(id);
        Ok(())
    }
}

#[async_trait]
impl PresenceGateway for FakeBackend {
    async fn records_for(&self, date: NaiveDate) -> AppResult<Vec<AttendanceRecord>> {
        self.hit();
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(AppError::Timeout);
        }
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn record(&self, request: &RecordPresenceRequest) -> AppResult<()> {
        self.hit();
        tokio::task::yield_now().await;
        if self.failing_saves.lock().contains(&request.membre_id) {
            return Err(AppError::Server { status: 500 });
        }
        self.saved.lock().push(request.clone());
        Ok(())
    }

    async fn mark_all_present(&self, date: NaiveDate) -> AppResult<Option<String>> {
        self.hit();
        self.mark_all_calls.lock().push(date);
        Ok(Some("Tous les membres marqués présents".to_string()))
    }

    async fn stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyAttendance>> {
        self.hit();
        self.stats_ranges.lock().push((start, end));
        Ok(Vec::new())
    }

    async fn report(&self, date: NaiveDate) -> AppResult<serde_json::Value> {
        self.hit();
        Ok(serde_json::json!({ "date": date.to_string() }))
    }
}

#[async_trait]
impl PresenceAdminGateway for FakeBackend {
    async fn by_date(&self, date: NaiveDate, service: Option<&str>) -> AppResult<PresenceOverview> {
        self.hit();
        self.overview_services.lock().push(service.map(str::to_string));
        let rows = self.overview_rows.lock().clone();
        let present = rows.iter().filter(|r| r.present).count();
        Ok(PresenceOverview {
            date,
            service: service.map(str::to_string),
            stats: megadata_core::AttendanceStats::from_counts(rows.len(), present),
            rows,
        })
    }

    async fn member_history(&self, _id: MemberId) -> AppResult<Vec<PresenceHistoryEntry>> {
        self.hit();
        Ok(self.history.lock().clone())
    }

    async fn stats_by_service(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<ServiceAttendance>> {
        self.hit();
        self.stats_ranges.lock().push((start, end));
        Ok(self.service_stats.lock().clone())
    }
}

#[async_trait]
impl HealthGateway for FakeBackend {
    async fn health(&self) -> HealthStatus {
        self.hit();
        HealthStatus {
            online: self.online.load(Ordering::SeqCst),
            base_url: "fake://backend".to_string(),
            version: None,
            services: None,
            error: None,
        }
    }
}
