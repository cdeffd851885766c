//! In-process stand-in for the MEGA-DATA REST backend
//!
//! Speaks the same JSON envelope and French field names as the real
//! backend, keeps its data in memory, and records what the client sent so
//! tests can assert on it.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use jsonwebtoken::{decode, DecodingKey, Validation};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::fixtures::{Account, MemberRow, FAR_FUTURE, TOKEN_SECRET};

type Reply = Result<Json<Value>, Response>;

/// Shared backend data
#[derive(Debug, Default)]
pub struct BackendState {
    pub accounts: Mutex<Vec<Account>>,
    pub members: Mutex<Vec<MemberRow>>,
    /// (member, date) -> (present, comment)
    pub presences: Mutex<BTreeMap<(i64, NaiveDate), (bool, String)>>,
    /// Members whose presence writes fail with 500
    pub failing_records: Mutex<HashSet<i64>>,
    /// Answer every authenticated call with 401
    pub reject_tokens: AtomicBool,
    pub record_calls: AtomicUsize,
    pub mark_all_calls: AtomicUsize,
    pub stats_queries: Mutex<Vec<(String, String)>>,
    next_id: AtomicI64,
}

impl BackendState {
    pub fn seeded(accounts: Vec<Account>, members: Vec<MemberRow>) -> Arc<Self> {
        let state = Self {
            accounts: Mutex::new(accounts),
            members: Mutex::new(members),
            next_id: AtomicI64::new(100),
            ..Self::default()
        };
        Arc::new(state)
    }

    pub fn presence(&self, member_id: i64, date: NaiveDate) -> Option<(bool, String)> {
        self.presences.lock().get(&(member_id, date)).cloned()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// Build the router
pub fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/profile", get(profile))
        .route("/members", post(create_member))
        .route("/members/my-members", get(my_members))
        .route("/members/all", get(all_members))
        .route("/members/search", get(search_members))
        .route("/members/users", get(list_users))
        .route("/members/users/:id/role", put(set_role))
        .route("/members/users/:id", delete(delete_user))
        .route("/members/:id", delete(delete_member))
        .route("/presence/date/:date", get(presence_by_date))
        .route("/presence/record", post(record_presence))
        .route("/presence/mark-all", post(mark_all))
        .route("/presence/stats", get(presence_stats))
        .route("/presence/report/:date", get(presence_report))
        .route("/admin/presence/date/:date", get(admin_by_date))
        .route("/admin/presence/member/:id", get(admin_member_history))
        .route("/admin/presence/stats/service", get(admin_stats_by_service))
        .with_state(state)
}

// ============================================================================
// Auth helpers
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct Caller {
    id: i64,
    role: String,
    #[serde(rename = "serviceAssigne")]
    service: Option<String>,
}

impl Caller {
    fn is_admin(&self) -> bool {
        matches!(self.role.as_str(), "admin" | "super_admin")
    }
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn caller(state: &BackendState, headers: &HeaderMap) -> Result<Caller, Response> {
    let unauthorized = || fail(StatusCode::UNAUTHORIZED, "Token invalide");
    if state.reject_tokens.load(Ordering::SeqCst) {
        return Err(unauthorized());
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;
    decode::<Caller>(token, &DecodingKey::from_secret(TOKEN_SECRET), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| unauthorized())
}

fn admin(state: &BackendState, headers: &HeaderMap) -> Result<Caller, Response> {
    let caller = caller(state, headers)?;
    if !caller.is_admin() {
        return Err(fail(StatusCode::FORBIDDEN, "Accès réservé aux administrateurs"));
    }
    Ok(caller)
}

fn parse_date(raw: &str) -> Result<NaiveDate, Response> {
    raw.parse()
        .map_err(|_| fail(StatusCode::BAD_REQUEST, "Date invalide"))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "version": "1.0.0",
        "services": { "database": "connected" },
    }))
}

#[derive(Deserialize)]
struct LoginBody {
    login: String,
    password: String,
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<LoginBody>) -> Reply {
    let accounts = state.accounts.lock();
    let account = accounts
        .iter()
        .find(|a| a.username == body.login && a.password == body.password)
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Identifiants invalides"))?;
    Ok(Json(json!({
        "success": true,
        "token": account.token(FAR_FUTURE),
        "user": account,
    })))
}

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    password: String,
    nom: String,
    prenom: String,
}

async fn register(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Value>), Response> {
    let mut accounts = state.accounts.lock();
    if accounts.iter().any(|a| a.username == body.username) {
        return Err(fail(StatusCode::CONFLICT, "Nom d'utilisateur déjà pris"));
    }
    let mut account = Account::new(state.next_id(), &body.username, "member", None);
    account.password = body.password;
    account.nom = body.nom;
    account.prenom = body.prenom;
    let reply = json!({
        "success": true,
        "token": account.token(FAR_FUTURE),
        "user": account,
    });
    accounts.push(account);
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn profile(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Reply {
    let caller = caller(&state, &headers)?;
    let accounts = state.accounts.lock();
    let account = accounts
        .iter()
        .find(|a| a.id == caller.id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Utilisateur introuvable"))?;
    Ok(Json(json!({ "success": true, "user": account })))
}

fn members_reply<'a>(members: impl Iterator<Item = &'a MemberRow>) -> Json<Value> {
    let membres: Vec<Value> = members.map(MemberRow::to_json).collect();
    Json(json!({ "success": true, "membres": membres }))
}

async fn my_members(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Reply {
    let caller = caller(&state, &headers)?;
    let members = state.members.lock();
    Ok(members_reply(
        members
            .iter()
            .filter(|m| Some(&m.service) == caller.service.as_ref()),
    ))
}

async fn all_members(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Reply {
    admin(&state, &headers)?;
    Ok(members_reply(state.members.lock().iter()))
}

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
    service: Option<String>,
}

async fn search_members(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Reply {
    caller(&state, &headers)?;
    let query = params.query.map(|q| q.to_lowercase());
    let members = state.members.lock();
    Ok(members_reply(members.iter().filter(|m| {
        params.service.as_ref().map_or(true, |s| &m.service == s)
            && query.as_ref().map_or(true, |q| {
                m.nom.to_lowercase().contains(q) || m.prenom.to_lowercase().contains(q)
            })
    })))
}

#[derive(Deserialize)]
struct MemberBody {
    nom: String,
    prenom: String,
    numero: String,
    quartier: String,
    service: String,
}

async fn create_member(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<MemberBody>,
) -> Result<(StatusCode, Json<Value>), Response> {
    let caller = caller(&state, &headers)?;
    let row = MemberRow {
        id: state.next_id(),
        nom: body.nom,
        prenom: body.prenom,
        numero: body.numero,
        quartier: Some(body.quartier),
        service: body.service,
        user_id: caller.id,
    };
    let reply = json!({ "success": true, "message": "Membre ajouté", "member": row.to_json() });
    state.members.lock().push(row);
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn delete_member(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    admin(&state, &headers)?;
    let mut members = state.members.lock();
    let before = members.len();
    members.retain(|m| m.id != id);
    if members.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "Membre introuvable"));
    }
    Ok(Json(json!({ "success": true })))
}

async fn list_users(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Reply {
    admin(&state, &headers)?;
    let accounts = state.accounts.lock();
    Ok(Json(json!({ "success": true, "users": *accounts })))
}

#[derive(Deserialize)]
struct RoleBody {
    role: String,
}

async fn set_role(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<RoleBody>,
) -> Reply {
    admin(&state, &headers)?;
    let mut accounts = state.accounts.lock();
    let account = accounts
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Utilisateur introuvable"))?;
    account.role = body.role;
    Ok(Json(json!({ "success": true, "message": "Rôle mis à jour" })))
}

async fn delete_user(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    admin(&state, &headers)?;
    state.accounts.lock().retain(|a| a.id != id);
    Ok(Json(json!({ "success": true })))
}

async fn presence_by_date(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Reply {
    let caller = caller(&state, &headers)?;
    let date = parse_date(&date)?;
    let members = state.members.lock();
    let presences = state.presences.lock();
    let membres: Vec<Value> = members
        .iter()
        .filter(|m| Some(&m.service) == caller.service.as_ref())
        .map(|m| {
            let presence = presences
                .get(&(m.id, date))
                .map(|(present, comment)| json!({ "present": present, "commentaire": comment }));
            json!({ "membre_id": m.id, "nom": m.nom, "prenom": m.prenom, "presence": presence })
        })
        .collect();
    Ok(Json(json!({ "success": true, "date": date, "membres": membres })))
}

#[derive(Deserialize)]
struct RecordBody {
    membre_id: i64,
    date: NaiveDate,
    present: bool,
    #[serde(default)]
    commentaire: String,
}

async fn record_presence(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<RecordBody>,
) -> Reply {
    caller(&state, &headers)?;
    state.record_calls.fetch_add(1, Ordering::SeqCst);
    if state.failing_records.lock().contains(&body.membre_id) {
        return Err(fail(StatusCode::INTERNAL_SERVER_ERROR, "Erreur serveur"));
    }
    state
        .presences
        .lock()
        .insert((body.membre_id, body.date), (body.present, body.commentaire));
    Ok(Json(json!({ "success": true, "message": "Présence enregistrée" })))
}

#[derive(Deserialize)]
struct MarkAllBody {
    date: NaiveDate,
}

async fn mark_all(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<MarkAllBody>,
) -> Reply {
    let caller = caller(&state, &headers)?;
    state.mark_all_calls.fetch_add(1, Ordering::SeqCst);
    let members = state.members.lock();
    let mut presences = state.presences.lock();
    let mut count = 0;
    for member in members
        .iter()
        .filter(|m| Some(&m.service) == caller.service.as_ref())
    {
        presences.insert((member.id, body.date), (true, "Marqué présent automatiquement".to_string()));
        count += 1;
    }
    Ok(Json(json!({
        "success": true,
        "message": format!("{count} membres marqués présents"),
    })))
}

#[derive(Deserialize)]
struct RangeParams {
    #[serde(rename = "startDate")]
    start_date: String,
    #[serde(rename = "endDate")]
    end_date: String,
}

async fn presence_stats(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(range): Query<RangeParams>,
) -> Reply {
    caller(&state, &headers)?;
    let start = parse_date(&range.start_date)?;
    let end = parse_date(&range.end_date)?;
    state
        .stats_queries
        .lock()
        .push((range.start_date, range.end_date));

    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for ((_, date), (present, _)) in state.presences.lock().iter() {
        if (start..=end).contains(date) {
            let day = days.entry(*date).or_default();
            day.0 += 1;
            day.1 += u64::from(*present);
        }
    }
    let stats: Vec<Value> = days
        .into_iter()
        .map(|(date, (total, presents))| {
            // The backend sends these counts as strings
            json!({
                "date": format!("{date}T00:00:00.000Z"),
                "total_membres": total.to_string(),
                "presents": presents.to_string(),
                "absents": (total - presents).to_string(),
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "stats": stats })))
}

async fn presence_report(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Reply {
    let caller = caller(&state, &headers)?;
    let date = parse_date(&date)?;
    let presents = state
        .presences
        .lock()
        .iter()
        .filter(|((_, d), (present, _))| *d == date && *present)
        .count();
    Ok(Json(json!({
        "success": true,
        "date": date,
        "service": caller.service,
        "presents": presents,
    })))
}

#[derive(Deserialize)]
struct ServiceFilter {
    service: Option<String>,
}

async fn admin_by_date(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(date): Path<String>,
    Query(filter): Query<ServiceFilter>,
) -> Reply {
    admin(&state, &headers)?;
    let date = parse_date(&date)?;
    let members = state.members.lock();
    let presences = state.presences.lock();
    let rows: Vec<Value> = members
        .iter()
        .filter(|m| filter.service.as_ref().map_or(true, |s| &m.service == s))
        .filter_map(|m| {
            presences.get(&(m.id, date)).map(|(present, comment)| {
                json!({
                    "membre_id": m.id,
                    "nom": m.nom,
                    "prenom": m.prenom,
                    "service": m.service,
                    "quartier": m.quartier,
                    "present": present,
                    "commentaire": comment,
                    "berger_nom": "paul",
                })
            })
        })
        .collect();
    let presents = rows.iter().filter(|r| r["present"] == json!(true)).count();
    Ok(Json(json!({
        "success": true,
        "total": rows.len(),
        "presents": presents,
        "data": rows,
    })))
}

async fn admin_member_history(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    admin(&state, &headers)?;
    let service = state
        .members
        .lock()
        .iter()
        .find(|m| m.id == id)
        .map(|m| m.service.clone());
    let data: Vec<Value> = state
        .presences
        .lock()
        .iter()
        .filter(|((member, _), _)| *member == id)
        .rev()
        .map(|((_, date), (present, comment))| {
            json!({ "date": date, "present": present, "commentaire": comment, "service": service })
        })
        .collect();
    Ok(Json(json!({ "success": true, "data": data })))
}

async fn admin_stats_by_service(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(range): Query<RangeParams>,
) -> Reply {
    admin(&state, &headers)?;
    let start = parse_date(&range.start_date)?;
    let end = parse_date(&range.end_date)?;
    let members = state.members.lock();
    let mut services: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for ((member_id, date), (present, _)) in state.presences.lock().iter() {
        if !(start..=end).contains(date) {
            continue;
        }
        if let Some(member) = members.iter().find(|m| m.id == *member_id) {
            let entry = services.entry(member.service.clone()).or_default();
            entry.0 += 1;
            entry.1 += u64::from(*present);
        }
    }
    let stats: Vec<Value> = services
        .into_iter()
        .map(|(service, (total, presents))| json!({ "service": service, "total": total, "presents": presents }))
        .collect();
    Ok(Json(json!({ "success": true, "total_services": stats.len(), "stats": stats })))
}
