use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::sequence::{SequenceGuard, Ticket};
use super::watcher::JobListSync;
use super::{FailureKind, PortalError, SyncOutcome};
use crate::api::{JobQuery, PortalApi};
use crate::domain::{
    ApplicationForm, ApplicationId, JobId, ProfileUpdate, StatusDecision, User, UserRole,
};
use crate::notify::{Notification, Notifier, Route};
use crate::store::{FilterCriteria, SessionStore, Stores};

/// User-facing action, used to pick fallback and login texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AppliedJobs,
    Applicants,
    SaveJob,
    Apply,
    UpdateStatus,
    UpdateProfile,
    DeleteAccount,
    Logout,
}

impl Action {
    fn fallback(self) -> &'static str {
        match self {
            Action::AppliedJobs => "Failed to fetch applied jobs",
            Action::Applicants => "Failed to fetch applicants",
            Action::SaveJob => "Failed to save job",
            Action::DeleteAccount => "Failed to delete account",
            Action::Logout => "Logout failed",
            Action::Apply | Action::UpdateStatus | Action::UpdateProfile => "Something went wrong",
        }
    }

    /// Text for a 4xx rejection whose body carried no message.
    fn rejection_fallback(self) -> &'static str {
        match self {
            Action::Apply => "You have already applied for this job",
            other => other.fallback(),
        }
    }

    fn login_prompt(self) -> &'static str {
        match self {
            Action::Apply => "Please login to apply for jobs",
            Action::Applicants => "Please login to view applicants",
            Action::SaveJob => "Please login to save jobs",
            _ => "Please login to continue",
        }
    }
}

/// Clears the session loading flag when dropped.
struct Loading<'a>(&'a SessionStore);

impl<'a> Loading<'a> {
    fn start(session: &'a SessionStore) -> Self {
        session.set_loading(true);
        Self(session)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}

/// Runs user actions against a [`PortalApi`] and writes confirmed results into
/// the stores. Failures are turned into notifications and also returned.
pub struct PortalClient<A, N> {
    api: Arc<A>,
    notifier: Arc<N>,
    stores: Arc<Stores>,
    job_requests: SequenceGuard,
    applicant_requests: SequenceGuard,
}

impl<A, N> PortalClient<A, N>
where
    A: PortalApi + 'static,
    N: Notifier + 'static,
{
    pub fn new(api: Arc<A>, notifier: Arc<N>) -> Self {
        Self::with_stores(api, notifier, Arc::new(Stores::default()))
    }

    pub fn with_stores(api: Arc<A>, notifier: Arc<N>, stores: Arc<Stores>) -> Self {
        Self {
            api,
            notifier,
            stores,
            job_requests: SequenceGuard::default(),
            applicant_requests: SequenceGuard::default(),
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn shared_stores(&self) -> Arc<Stores> {
        Arc::clone(&self.stores)
    }

    /// Keep the job list in step with the filter store until the handle is dropped.
    pub fn watch_jobs(self: &Arc<Self>) -> JobListSync {
        JobListSync::spawn(Arc::clone(self))
    }

    /// Fetch jobs for the current filters.
    ///
    /// The filter snapshot and sequence ticket are taken when this is called,
    /// not when the future is first polled, so call order decides which
    /// response wins when several are in flight.
    pub fn refresh_jobs(&self) -> impl Future<Output = Result<SyncOutcome, PortalError>> + '_ {
        let criteria = self.stores.filters.snapshot();
        let ticket = self.job_requests.issue();
        self.fetch_jobs(ticket, criteria)
    }

    pub(crate) fn issue_job_ticket(&self) -> Ticket {
        self.job_requests.issue()
    }

    /// Failures keep the previous list and are only logged.
    pub(crate) async fn fetch_jobs(
        &self,
        ticket: Ticket,
        criteria: FilterCriteria,
    ) -> Result<SyncOutcome, PortalError> {
        let query = JobQuery::from(&criteria);
        match self.api.fetch_jobs(&query).await {
            Ok(jobs) => {
                let count = jobs.len();
                let applications = &self.stores.applications;
                if self
                    .job_requests
                    .apply_if_newer(ticket, || applications.set_jobs(jobs))
                {
                    debug!(ticket = ticket.value(), count, "job list replaced");
                    Ok(SyncOutcome::Applied { count })
                } else {
                    debug!(ticket = ticket.value(), "discarding superseded job list");
                    Ok(SyncOutcome::Superseded)
                }
            }
            Err(error) => {
                warn!(ticket = ticket.value(), %error, "job refresh failed; keeping previous list");
                Err(error.into())
            }
        }
    }

    pub async fn load_applied_jobs(&self) -> Result<SyncOutcome, PortalError> {
        let Some((_, generation)) = self.stores.session.signed_in() else {
            debug!("no signed-in user; skipping applied jobs");
            return Ok(SyncOutcome::Skipped);
        };

        match self.api.applied_jobs().await {
            Ok(applications) => {
                let count = applications.len();
                let store = &self.stores.applications;
                let written = self
                    .stores
                    .session
                    .within(generation, || store.set_applied_jobs(applications));
                if written.is_some() {
                    debug!(count, "applied jobs replaced");
                    Ok(SyncOutcome::Applied { count })
                } else {
                    debug!(count, "discarding applied jobs from an ended session");
                    Ok(SyncOutcome::Superseded)
                }
            }
            Err(error) => Err(self.fail(Action::AppliedJobs, error.into())),
        }
    }

    /// Recruiter-only; other signed-in roles are skipped without a request.
    pub async fn load_applicants(&self, job_id: &JobId) -> Result<SyncOutcome, PortalError> {
        let Some((user, generation)) = self.stores.session.signed_in() else {
            return Err(self.fail(Action::Applicants, PortalError::SignInRequired));
        };
        if user.role != UserRole::Recruiter {
            debug!(%job_id, role = ?user.role, "applicant list is recruiter-only; skipping");
            return Ok(SyncOutcome::Skipped);
        }

        let ticket = self.applicant_requests.issue();
        match self.api.applicants(job_id).await {
            Ok(applications) => {
                let count = applications.len();
                let store = &self.stores.applications;
                let written = self.stores.session.within(generation, || {
                    self.applicant_requests.apply_if_newer(ticket, || {
                        store.set_applicants_for_job(job_id.clone(), applications)
                    })
                });
                if written == Some(true) {
                    debug!(%job_id, count, "applicants replaced");
                    Ok(SyncOutcome::Applied { count })
                } else {
                    debug!(%job_id, "discarding superseded applicant list");
                    Ok(SyncOutcome::Superseded)
                }
            }
            Err(error) => Err(self.fail(Action::Applicants, error.into())),
        }
    }

    /// Toggle a saved job on the server and adopt the returned user.
    /// Returns whether the job is saved afterwards.
    ///
    /// A confirmation that arrives after the session ended is reported back
    /// but not written.
    pub async fn toggle_saved_job(&self, job_id: &JobId) -> Result<bool, PortalError> {
        let generation = self.stores.session.generation();
        match self.api.save_job(job_id).await {
            Ok(change) => {
                let saved = change.user.profile.saved_jobs.contains(job_id);
                if !self.stores.session.set_user_within(generation, change.user) {
                    debug!(%job_id, saved, "discarding saved jobs from an ended session");
                    return Ok(saved);
                }
                info!(%job_id, saved, "saved jobs updated");
                let message = change.message.unwrap_or_else(|| {
                    let text = if saved {
                        "Job saved"
                    } else {
                        "Job removed from saved jobs"
                    };
                    text.to_string()
                });
                self.notifier.notify(Notification::success(message));
                Ok(saved)
            }
            Err(error) => Err(self.fail(Action::SaveJob, error.into())),
        }
    }

    /// Validation runs before any request; on success the caller is sent to
    /// the applied-jobs view.
    pub async fn submit_application(
        &self,
        job_id: &JobId,
        form: &ApplicationForm,
    ) -> Result<(), PortalError> {
        if self.stores.session.current_user().is_none() {
            return Err(self.fail(Action::Apply, PortalError::SignInRequired));
        }
        if let Err(invalid) = form.validate() {
            return Err(self.fail(Action::Apply, invalid.into()));
        }

        let _loading = Loading::start(&self.stores.session);
        match self.api.apply(job_id, form).await {
            Ok(ack) => {
                info!(%job_id, "application submitted");
                self.notifier.notify(
                    Notification::success(
                        ack.message
                            .unwrap_or_else(|| "Application submitted successfully".to_string()),
                    )
                    .redirect_to(Route::AppliedJobs),
                );
                Ok(())
            }
            Err(error) => Err(self.fail(Action::Apply, error.into())),
        }
    }

    /// Decide a pending application. Decided applications known locally are
    /// refused without a request.
    pub async fn update_status(
        &self,
        application_id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<(), PortalError> {
        if let Some(current) = self.stores.applications.status_of(application_id) {
            if let Err(decided) = current.apply(decision) {
                return Err(self.fail(Action::UpdateStatus, decided.into()));
            }
        }

        let generation = self.stores.session.generation();
        match self.api.update_status(application_id, decision).await {
            Ok(ack) => {
                let store = &self.stores.applications;
                match self.stores.session.within(generation, || {
                    store.record_status(application_id, decision)
                }) {
                    Some(Ok(patched)) => {
                        debug!(%application_id, ?decision, patched, "status recorded")
                    }
                    Some(Err(error)) => {
                        warn!(%application_id, %error, "status changed concurrently")
                    }
                    None => debug!(%application_id, "session ended; status not recorded"),
                }
                self.notifier.notify(Notification::success(
                    ack.message
                        .unwrap_or_else(|| "Status updated successfully".to_string()),
                ));
                Ok(())
            }
            Err(error) => Err(self.fail(Action::UpdateStatus, error.into())),
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, PortalError> {
        if let Err(invalid) = update.validate() {
            return Err(self.fail(Action::UpdateProfile, invalid.into()));
        }

        let generation = self.stores.session.generation();
        let _loading = Loading::start(&self.stores.session);
        match self.api.update_profile(update).await {
            Ok(change) => {
                if !self
                    .stores
                    .session
                    .set_user_within(generation, change.user.clone())
                {
                    debug!(user = %change.user.id, "discarding profile from an ended session");
                    return Ok(change.user);
                }
                info!(user = %change.user.id, "profile updated");
                self.notifier.notify(Notification::success(
                    change
                        .message
                        .unwrap_or_else(|| "Profile updated successfully".to_string()),
                ));
                Ok(change.user)
            }
            Err(error) => Err(self.fail(Action::UpdateProfile, error.into())),
        }
    }

    pub async fn delete_account(&self) -> Result<(), PortalError> {
        match self.api.delete_account().await {
            Ok(ack) => {
                self.end_session();
                info!("account deleted");
                self.notifier.notify(
                    Notification::success(
                        ack.message
                            .unwrap_or_else(|| "Account deleted successfully".to_string()),
                    )
                    .redirect_to(Route::Signup),
                );
                Ok(())
            }
            Err(error) => Err(self.fail(Action::DeleteAccount, error.into())),
        }
    }

    /// The local session is cleared whether or not the server confirms.
    pub async fn logout(&self) -> Result<(), PortalError> {
        let result = self.api.logout().await;
        self.end_session();
        match result {
            Ok(ack) => {
                info!("logged out");
                self.notifier.notify(
                    Notification::success(
                        ack.message
                            .unwrap_or_else(|| "Logged out successfully".to_string()),
                    )
                    .redirect_to(Route::Home),
                );
                Ok(())
            }
            Err(error) => {
                let error = PortalError::from(error);
                warn!(%error, "server logout failed; local session cleared anyway");
                self.notifier.notify(
                    Notification::error(
                        error
                            .user_message()
                            .unwrap_or_else(|| Action::Logout.fallback().to_string()),
                    )
                    .redirect_to(Route::Home),
                );
                Err(error)
            }
        }
    }

    /// Clearing the user bumps the session generation, so responses still in
    /// flight for this session are dropped when they land.
    fn end_session(&self) {
        self.stores.session.set_user(None);
        self.stores.applications.clear();
    }

    /// Log, notify and hand the error back.
    fn fail(&self, action: Action, error: PortalError) -> PortalError {
        let kind = error.kind();
        warn!(?action, ?kind, %error, "portal action failed");
        let notification = match kind {
            FailureKind::AuthenticationRequired => {
                Notification::error(action.login_prompt()).redirect_to(Route::Login)
            }
            FailureKind::Rejected => Notification::error(
                error
                    .user_message()
                    .unwrap_or_else(|| action.rejection_fallback().to_string()),
            ),
            FailureKind::Transient => Notification::error(
                error
                    .user_message()
                    .unwrap_or_else(|| action.fallback().to_string()),
            ),
        };
        self.notifier.notify(notification);
        error
    }
}
