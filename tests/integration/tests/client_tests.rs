//! Client Integration Tests
//!
//! Drive the real HTTP client against the in-process fake backend.
//!
//! Run with: cargo test -p integration-tests --test client_tests

use chrono::NaiveDate;
use std::sync::atomic::Ordering;

use integration_tests::{fixtures::*, TestServer};
use megadata_client::dto::LoginRequest;
use megadata_client::{
    AttendanceRecorder, AuthService, HealthService, MemberService, PresenceAdminService,
    ServiceContext, ServiceError, SessionStore, UserService,
};
use megadata_common::AppError;
use megadata_core::{
    AttendanceStats, Confirmation, DomainError, GuardDecision, MemberId, NewMember,
    RedirectReason, Role, Screen, UserId,
};

fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn stats(total: usize, present: usize, absent: usize, rate: u32) -> AttendanceStats {
    AttendanceStats {
        total,
        present,
        absent,
        rate,
    }
}

fn login(login: &str, password: &str) -> LoginRequest {
    LoginRequest {
        login: login.to_string(),
        password: password.to_string(),
    }
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_online() {
    let server = TestServer::start().await.expect("Failed to start backend");
    let ctx = server.context().unwrap();

    let status = HealthService::new(&ctx).check().await;
    assert!(status.online);
    assert_eq!(status.version.as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn test_health_offline() {
    let ctx = ServiceContext::connect(
        integration_tests::api_config("http://127.0.0.1:9"),
        SessionStore::in_memory(),
    )
    .unwrap();

    let status = HealthService::new(&ctx).check().await;
    assert!(!status.online);
    assert!(status.error.is_some());
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_login_persists_session() {
    let server = TestServer::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let ctx = server.context_with_file(&path).unwrap();
    let response = AuthService::new(&ctx)
        .login(login("paul", PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.session.role, Role::Berger);
    assert_eq!(response.session.assigned_service(), Some("Accueil"));
    assert_eq!(response.home, Screen::Berger);

    // A fresh process picks the session up from disk
    let restored = server.context_with_file(&path).unwrap();
    let session = restored.session().current().unwrap();
    assert_eq!(session.user_id, UserId::new(2));
    assert_eq!(session.assigned_service(), Some("Accueil"));
}

#[tokio::test]
async fn test_wrong_password() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.context().unwrap();

    let err = AuthService::new(&ctx)
        .login(login("paul", "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::App(AppError::InvalidCredentials)));
    assert!(ctx.session().current().is_none());
}

#[tokio::test]
async fn test_profile_round_trip() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&berger()).unwrap();

    let profile = AuthService::new(&ctx).profile().await.unwrap();
    assert_eq!(profile.username, "paul");
    assert_eq!(profile.assigned_service.as_deref(), Some("Accueil"));
}

#[tokio::test]
async fn test_rejected_token_purges_session() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&berger()).unwrap();
    let mut events = ctx.session().subscribe();
    server.state.reject_tokens.store(true, Ordering::SeqCst);

    let err = MemberService::new(&ctx).my_members().await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(ctx.session().current().is_none());
    assert_eq!(events.try_recv().unwrap().event_type(), "EXPIRED");
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.context().unwrap();
    let expired = berger().token(1_000);
    let session = ctx.token_decoder().to_session(&expired).unwrap();
    ctx.session().establish(session).unwrap();

    let decision = AuthService::new(&ctx).guard(Screen::Presence).unwrap();
    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: Screen::Login,
            reason: RedirectReason::Expired
        }
    );
    assert!(ctx.session().current().is_none());
}

// ============================================================================
// Member Tests
// ============================================================================

#[tokio::test]
async fn test_berger_sees_own_roster() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&berger()).unwrap();

    let members = MemberService::new(&ctx).my_members().await.unwrap();
    assert_eq!(members.len(), 3);
    assert!(members.iter().all(|m| m.service == "Accueil"));
}

#[tokio::test]
async fn test_berger_registers_member() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&berger()).unwrap();
    let form = NewMember {
        last_name: "Mbuyi".to_string(),
        first_name: "Joel".to_string(),
        phone: "+243 820 111 222".to_string(),
        neighborhood: "Matete".to_string(),
        service: String::new(),
    };

    let created = MemberService::new(&ctx).register(form).await.unwrap().unwrap();
    assert_eq!(created.service, "Accueil");
    assert_eq!(MemberService::new(&ctx).my_members().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_admin_member_search() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&admin()).unwrap();
    let service = MemberService::new(&ctx);

    assert_eq!(service.all_members().await.unwrap().len(), 4);
    let found = service.search(Some("chiku"), None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, MemberId::new(13));

    service.delete(MemberId::new(21)).await.unwrap();
    assert_eq!(service.all_members().await.unwrap().len(), 3);
}

// ============================================================================
// User Administration Tests
// ============================================================================

#[tokio::test]
async fn test_admin_manages_roles() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&admin()).unwrap();
    let users = UserService::new(&ctx);

    let breakdown = users.breakdown().await.unwrap();
    assert_eq!((breakdown.total, breakdown.admins, breakdown.bergers), (3, 1, 1));

    users.set_role(UserId::new(3), Role::Berger).await.unwrap();
    let accounts = users.list().await.unwrap();
    let anne = accounts.iter().find(|a| a.username == "anne").unwrap();
    assert_eq!(anne.role, Role::Berger);
}

#[tokio::test]
async fn test_non_admin_cannot_list_users() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&member_account()).unwrap();

    // The client guard stops this before any request is made
    let err = UserService::new(&ctx).list().await.unwrap_err();
    assert!(matches!(err, ServiceError::App(AppError::Forbidden)));
}

// ============================================================================
// Attendance Tests
// ============================================================================

#[tokio::test]
async fn test_take_attendance_end_to_end() {
    let server = TestServer::start().await.unwrap();
    let ctx = server.signed_in(&berger()).unwrap();
    let recorder = AttendanceRecorder::new(ctx.clone());

    assert_eq!(recorder.load(sunday()).await.unwrap(), stats(3, 3, 0, 100));

    recorder.toggle(MemberId::new(12)).unwrap();
    recorder.set_comment(MemberId::new(12), "En voyage").unwrap();
    assert_eq!(recorder.stats().unwrap(), stats(3, 2, 1, 67));

    assert_eq!(recorder.save().await.unwrap(), 3);
    assert_eq!(server.state.record_calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        server.state.presence(12, sunday()),
        Some((false, "En voyage".to_string()))
    );
    assert_eq!(server.state.presence(11, sunday()), Some((true, String::new())));

    // Reloading shows what was saved
    let reloaded = AttendanceRecorder::new(ctx);
    assert_eq!(reloaded.load(sunday()).await.unwrap(), stats(3, 2, 1, 67));
    let sheet = reloaded.sheet().unwrap();
    assert_eq!(
        sheet.entry(MemberId::new(12)).unwrap().comment.as_deref(),
        Some("En voyage")
    );
}

#[tokio::test]
async fn test_all_absent_then_save() {
    let server = TestServer::start().await.unwrap();
    let recorder = AttendanceRecorder::new(server.signed_in(&berger()).unwrap());
    recorder.load(sunday()).await.unwrap();

    recorder.mark_all_absent(Confirmation::Confirmed).unwrap();
    assert_eq!(recorder.stats().unwrap(), stats(3, 0, 3, 0));
    recorder.save().await.unwrap();

    for id in [11, 12, 13] {
        assert_eq!(
            server.state.presence(id, sunday()),
            Some((false, "Absent".to_string()))
        );
    }
}

#[tokio::test]
async fn test_failed_write_surfaces_one_error() {
    let server = TestServer::start().await.unwrap();
    server.state.failing_records.lock().insert(13);
    let recorder = AttendanceRecorder::new(server.signed_in(&berger()).unwrap());
    recorder.load(sunday()).await.unwrap();
    recorder.toggle(MemberId::new(11)).unwrap();

    let err = recorder.save().await.unwrap_err();
    assert!(matches!(err, ServiceError::SaveFailed { failed: 1, total: 3 }));
    assert!(!recorder.is_saving());
    assert_eq!(recorder.stats().unwrap(), stats(3, 2, 1, 67));

    server.state.failing_records.lock().clear();
    assert_eq!(recorder.save().await.unwrap(), 3);
    assert_eq!(server.state.presence(13, sunday()), Some((true, String::new())));
}

#[tokio::test]
async fn test_mark_all_present_is_one_call() {
    let server = TestServer::start().await.unwrap();
    let recorder = AttendanceRecorder::new(server.signed_in(&berger()).unwrap());
    recorder.load(sunday()).await.unwrap();
    recorder.toggle(MemberId::new(11)).unwrap();

    let message = recorder.mark_all_present(Confirmation::Confirmed).await.unwrap();
    assert_eq!(message, "3 membres marqués présents");
    assert_eq!(server.state.mark_all_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.state.record_calls.load(Ordering::SeqCst), 0);
    assert_eq!(recorder.stats().unwrap(), stats(3, 3, 0, 100));
}

#[tokio::test]
async fn test_berger_without_service_cannot_load() {
    let server = TestServer::start().await.unwrap();
    let unassigned = Account::new(9, "luc", "berger", None);
    let recorder = AttendanceRecorder::new(server.signed_in(&unassigned).unwrap());

    let err = recorder.load(sunday()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::MissingAssignedService)));
    assert!(recorder.sheet().is_none());
}

#[tokio::test]
async fn test_history_and_report() {
    let server = TestServer::start().await.unwrap();
    let recorder = AttendanceRecorder::new(server.signed_in(&berger()).unwrap());
    recorder.load(sunday()).await.unwrap();
    recorder.toggle(MemberId::new(13)).unwrap();
    recorder.save().await.unwrap();

    let history = recorder.history(sunday()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].date, sunday());
    assert_eq!(history[0].stats, stats(3, 2, 1, 67));
    assert_eq!(
        *server.state.stats_queries.lock(),
        vec![("2024-02-09".to_string(), "2024-03-10".to_string())]
    );

    let report = recorder.report(sunday()).await.unwrap();
    assert_eq!(report["presents"], 2);
}

// ============================================================================
// Presence Administration Tests
// ============================================================================

#[tokio::test]
async fn test_admin_presence_views() {
    let server = TestServer::start().await.unwrap();
    let recorder = AttendanceRecorder::new(server.signed_in(&berger()).unwrap());
    recorder.load(sunday()).await.unwrap();
    recorder.toggle(MemberId::new(12)).unwrap();
    recorder.save().await.unwrap();

    let ctx = server.signed_in(&admin()).unwrap();
    let service = PresenceAdminService::new(&ctx);

    let overview = service.overview(sunday(), Some("tous")).await.unwrap();
    assert_eq!(overview.rows.len(), 3);
    assert_eq!(overview.stats, stats(3, 2, 1, 67));

    let chorale = service.overview(sunday(), Some("Chorale")).await.unwrap();
    assert!(chorale.rows.is_empty());

    let history = service.member_history(MemberId::new(12)).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].present);

    let by_service = service
        .stats_by_service(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), sunday())
        .await
        .unwrap();
    assert_eq!(by_service.len(), 1);
    assert_eq!(by_service[0].service, "Accueil");
    assert_eq!(by_service[0].stats.rate, 67);
}
