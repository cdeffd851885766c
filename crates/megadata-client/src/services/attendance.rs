//! Attendance recorder
//!
//! Drives a berger's attendance sheet for one date: loads the roster and
//! existing records, applies edits through [`AttendanceLedger`], and writes
//! one presence record per member on save. A saving flag rejects a second
//! save (or bulk call) while one is pending.
//!
//! The sheet belongs to the session that loaded it: any sign-in, sign-out or
//! expiry seen on the session store drops it, and writes are refused when
//! the signed-in berger's service no longer matches the sheet.

use chrono::{Days, NaiveDate};
use futures::future::join_all;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, instrument, warn};

use megadata_core::{
    AttendanceLedger, AttendanceStats, Confirmation, DomainError, MemberId, PresenceState,
    RouteConstraint, Session, SessionEvent,
};

use crate::dto::{DailyAttendance, RecordPresenceRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::feedback::{Banner, Feedback};

/// Days covered by the presence history request
pub const HISTORY_WINDOW_DAYS: u64 = 30;

const SAVED_MESSAGE: &str = "Attendance saved";
const ALL_PRESENT_MESSAGE: &str = "Everyone marked present";
const ALL_ABSENT_MESSAGE: &str = "Everyone marked absent";

/// Clears the saving flag when dropped
struct SavingGuard<'a>(&'a AtomicBool);

impl<'a> SavingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> ServiceResult<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(DomainError::SaveInProgress.into());
        }
        Ok(Self(flag))
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Attendance recorder for the signed-in berger
pub struct AttendanceRecorder {
    ctx: ServiceContext,
    sheet: Mutex<Option<AttendanceLedger>>,
    session_events: Mutex<broadcast::Receiver<SessionEvent>>,
    saving: AtomicBool,
    feedback: Mutex<Feedback>,
}

impl AttendanceRecorder {
    pub fn new(ctx: ServiceContext) -> Self {
        let session_events = Mutex::new(ctx.session().subscribe());
        Self {
            ctx,
            sheet: Mutex::new(None),
            session_events,
            saving: AtomicBool::new(false),
            feedback: Mutex::new(Feedback::default()),
        }
    }

    /// Load the sheet for `date`
    ///
    /// A failed roster fetch leaves an empty sheet behind; a failed record
    /// fetch is treated as "nothing recorded yet".
    #[instrument(skip(self))]
    pub async fn load(&self, date: NaiveDate) -> ServiceResult<AttendanceStats> {
        let session = self.ctx.require(RouteConstraint::BergerOnly)?;
        let Some(service) = session.assigned_service().map(str::to_string) else {
            *self.current_sheet() = None;
            return Err(self.fail(DomainError::MissingAssignedService.into()));
        };

        let roster = match self.ctx.member_gateway().my_members().await {
            Ok(roster) => roster,
            Err(e) => {
                warn!(error = %e, service = %service, "Failed to load roster");
                *self.current_sheet() = Some(AttendanceLedger::load(service, date, Vec::new(), &[]));
                return Err(self.fail(e.into()));
            }
        };

        let records = self
            .ctx
            .presence_gateway()
            .records_for(date)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, %date, "Failed to load existing records, starting fresh");
                Vec::new()
            });

        let ledger = AttendanceLedger::load(service, date, roster, &records);
        let stats = ledger.stats();
        debug!(members = stats.total, records = records.len(), "Attendance sheet loaded");
        *self.current_sheet() = Some(ledger);
        Ok(stats)
    }

    /// Snapshot of the loaded sheet
    pub fn sheet(&self) -> Option<AttendanceLedger> {
        self.current_sheet().clone()
    }

    pub fn stats(&self) -> Option<AttendanceStats> {
        self.current_sheet().as_ref().map(AttendanceLedger::stats)
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Flip one member between present and absent
    pub fn toggle(&self, member_id: MemberId) -> ServiceResult<PresenceState> {
        self.with_sheet(|sheet| sheet.toggle(member_id))
    }

    /// Set the comment of an absent member
    pub fn set_comment(&self, member_id: MemberId, text: impl Into<String>) -> ServiceResult<()> {
        let text = text.into();
        self.with_sheet(|sheet| sheet.set_comment(member_id, text))
    }

    /// Ask the backend to mark everyone present, then mirror it locally
    #[instrument(skip(self))]
    pub async fn mark_all_present(&self, confirmation: Confirmation) -> ServiceResult<String> {
        confirmation.ensure()?;
        let session = self.ctx.require(RouteConstraint::BergerOnly)?;
        let date = self.owned_sheet(&session, AttendanceLedger::date)?;
        let _saving = SavingGuard::acquire(&self.saving)?;

        let message = match self.ctx.presence_gateway().mark_all_present(date).await {
            Ok(message) => message.unwrap_or_else(|| ALL_PRESENT_MESSAGE.to_string()),
            Err(e) => {
                warn!(error = %e, %date, "Bulk mark-present rejected");
                return Err(self.fail(e.into()));
            }
        };

        self.with_sheet(|sheet| sheet.set_all_present(Confirmation::Confirmed))?;
        info!(user_id = %session.user_id, %date, "Everyone marked present");
        self.notify(Banner::success(message.clone()));
        Ok(message)
    }

    /// Mark everyone absent locally; nothing is sent until save
    pub fn mark_all_absent(&self, confirmation: Confirmation) -> ServiceResult<()> {
        self.with_sheet(|sheet| sheet.set_all_absent(confirmation))?;
        self.notify(Banner::success(ALL_ABSENT_MESSAGE));
        Ok(())
    }

    /// Write one record per roster member, concurrently
    ///
    /// Succeeds only if every write succeeds. On failure the sheet keeps its
    /// edits so the save can be retried.
    #[instrument(skip(self))]
    pub async fn save(&self) -> ServiceResult<usize> {
        let _saving = SavingGuard::acquire(&self.saving)?;
        let session = self.ctx.require(RouteConstraint::BergerOnly)?;
        let requests = self.owned_sheet(&session, |sheet| {
            sheet
                .records(Some(session.user_id))
                .iter()
                .map(RecordPresenceRequest::from)
                .collect::<Vec<_>>()
        })?;
        let total = requests.len();

        let gateway = self.ctx.presence_gateway();
        let results = join_all(requests.iter().map(|request| gateway.record(request))).await;

        let failed = results
            .iter()
            .zip(&requests)
            .filter_map(|(result, request)| result.as_ref().err().map(|e| (request.membre_id, e)))
            .inspect(|(member_id, e)| warn!(member_id = %member_id, error = %e, "Presence write failed"))
            .count();

        if failed > 0 {
            return Err(self.fail(ServiceError::SaveFailed { failed, total }));
        }

        info!(records = total, "Attendance saved");
        self.notify(Banner::success(SAVED_MESSAGE));
        Ok(total)
    }

    /// Daily aggregates over the 30 days ending at `date`
    #[instrument(skip(self))]
    pub async fn history(&self, date: NaiveDate) -> ServiceResult<Vec<DailyAttendance>> {
        self.ctx.require(RouteConstraint::BergerOnly)?;
        let start = date
            .checked_sub_days(Days::new(HISTORY_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        Ok(self.ctx.presence_gateway().stats(start, date).await?)
    }

    /// Backend report for one date
    #[instrument(skip(self))]
    pub async fn report(&self, date: NaiveDate) -> ServiceResult<serde_json::Value> {
        self.ctx.require(RouteConstraint::BergerOnly)?;
        Ok(self.ctx.presence_gateway().report(date).await?)
    }

    /// Banner currently on screen
    pub fn feedback(&self) -> Option<Banner> {
        self.feedback.lock().visible().cloned()
    }

    pub fn dismiss_feedback(&self) {
        self.feedback.lock().dismiss();
    }

    /// Sheet lock, after dropping the sheet if the signed-in identity changed
    fn current_sheet(&self) -> MutexGuard<'_, Option<AttendanceLedger>> {
        let mut sheet = self.sheet.lock();
        let mut events = self.session_events.lock();
        loop {
            match events.try_recv() {
                Ok(SessionEvent::Updated(_)) => {}
                Ok(event) => {
                    if sheet.take().is_some() {
                        debug!(event = event.event_type(), "Session changed, attendance sheet dropped");
                    }
                }
                Err(TryRecvError::Lagged(missed)) => {
                    debug!(missed, "Session events missed, attendance sheet dropped");
                    *sheet = None;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        sheet
    }

    /// Read the sheet for a write on behalf of `session`
    ///
    /// A sheet loaded for another service is dropped and never written.
    fn owned_sheet<T>(
        &self,
        session: &Session,
        f: impl FnOnce(&AttendanceLedger) -> T,
    ) -> ServiceResult<T> {
        let mut guard = self.current_sheet();
        let sheet = guard.as_ref().ok_or(DomainError::NoSheetLoaded)?;
        if session.assigned_service() != Some(sheet.service()) {
            warn!(
                sheet_service = %sheet.service(),
                session_service = ?session.assigned_service(),
                "Attendance sheet belongs to another service, dropped"
            );
            *guard = None;
            return Err(DomainError::NoSheetLoaded.into());
        }
        Ok(f(sheet))
    }

    fn with_sheet<T>(
        &self,
        f: impl FnOnce(&mut AttendanceLedger) -> Result<T, DomainError>,
    ) -> ServiceResult<T> {
        let mut sheet = self.current_sheet();
        let sheet = sheet.as_mut().ok_or(DomainError::NoSheetLoaded)?;
        Ok(f(sheet)?)
    }

    fn notify(&self, banner: Banner) {
        self.feedback.lock().show(banner);
    }

    fn fail(&self, error: ServiceError) -> ServiceError {
        let message = match &error {
            ServiceError::App(e) => e.user_message(),
            other => other.to_string(),
        };
        self.notify(Banner::error(message));
        error
    }
}

impl std::fmt::Debug for AttendanceRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceRecorder")
            .field("sheet", &self.sheet.lock().as_ref().map(|s| (s.service().to_string(), s.date())))
            .field("saving", &self.is_saving())
            .finish()
    }
}
