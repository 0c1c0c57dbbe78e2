use tokio::sync::watch;

use super::Store;
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, Job, JobId, StatusDecision,
    StatusTransitionError,
};

/// Applicant list for the last job a recruiter opened.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantsForJob {
    pub job_id: JobId,
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationsState {
    pub jobs: Vec<Job>,
    pub applied_jobs: Vec<Application>,
    pub applicants: Option<ApplicantsForJob>,
}

/// Dashboard counters over the current user's applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationSummary {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl ApplicationsState {
    pub fn set_jobs(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
    }

    pub fn set_applied_jobs(&mut self, applications: Vec<Application>) {
        self.applied_jobs = applications;
    }

    /// Replaces whatever job was shown before; there is no per-job cache.
    pub fn set_applicants_for_job(&mut self, job_id: JobId, applications: Vec<Application>) {
        self.applicants = Some(ApplicantsForJob {
            job_id,
            applications,
        });
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applicants
            .iter()
            .flat_map(|applicants| applicants.applications.iter())
            .chain(self.applied_jobs.iter())
            .find(|application| &application.id == id)
    }

    /// Patch a confirmed decision into every local copy of the application.
    /// Terminal statuses are left untouched and reported as an error.
    pub fn record_status(
        &mut self,
        id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<bool, StatusTransitionError> {
        if let Some(existing) = self.application(id) {
            existing.status.apply(decision)?;
        }

        let next = ApplicationStatus::from(decision);
        let mut patched = false;
        let applicants = self
            .applicants
            .iter_mut()
            .flat_map(|applicants| applicants.applications.iter_mut());
        for application in applicants.chain(self.applied_jobs.iter_mut()) {
            if &application.id == id {
                application.status = next;
                patched = true;
            }
        }
        Ok(patched)
    }

    pub fn summary(&self) -> ApplicationSummary {
        self.applied_jobs.iter().fold(
            ApplicationSummary {
                total: self.applied_jobs.len(),
                ..ApplicationSummary::default()
            },
            |mut summary, application| {
                match application.status {
                    ApplicationStatus::Pending => summary.pending += 1,
                    ApplicationStatus::Accepted => summary.accepted += 1,
                    ApplicationStatus::Rejected => summary.rejected += 1,
                }
                summary
            },
        )
    }

    /// The first `limit` applications in server order.
    pub fn recent(&self, limit: usize) -> &[Application] {
        let end = limit.min(self.applied_jobs.len());
        &self.applied_jobs[..end]
    }
}

/// Owns the job list, the user's applications and the recruiter applicant list.
/// Every write is a wholesale replacement from an authoritative response.
#[derive(Debug)]
pub struct ApplicationsStore {
    inner: Store<ApplicationsState>,
}

impl Default for ApplicationsStore {
    fn default() -> Self {
        Self {
            inner: Store::new(ApplicationsState::default()),
        }
    }
}

impl ApplicationsStore {
    pub fn snapshot(&self) -> ApplicationsState {
        self.inner.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApplicationsState> {
        self.inner.subscribe()
    }

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        self.inner.update(|state| state.set_jobs(jobs));
    }

    pub fn set_applied_jobs(&self, applications: Vec<Application>) {
        self.inner.update(|state| state.set_applied_jobs(applications));
    }

    pub fn set_applicants_for_job(&self, job_id: JobId, applications: Vec<Application>) {
        self.inner
            .update(|state| state.set_applicants_for_job(job_id, applications));
    }

    pub fn record_status(
        &self,
        id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<bool, StatusTransitionError> {
        let mut outcome = Ok(false);
        self.inner.update_if(|state| {
            outcome = state.record_status(id, decision);
            matches!(outcome, Ok(true))
        });
        outcome
    }

    pub fn clear(&self) {
        self.inner.update(ApplicationsState::clear);
    }

    pub fn status_of(&self, id: &ApplicationId) -> Option<ApplicationStatus> {
        self.inner
            .read(|state| state.application(id).map(|application| application.status))
    }

    pub fn summary(&self) -> ApplicationSummary {
        self.inner.read(ApplicationsState::summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reference;

    fn application(id: &str, status: ApplicationStatus) -> Application {
        Application {
            id: ApplicationId::from(id),
            job: Reference::Id("j-1".to_string()),
            applicant: Reference::Id("u-1".to_string()),
            status,
            cover_letter: "Keen to join.".to_string(),
            experience: String::new(),
            skills: Vec::new(),
            education: String::new(),
            phone: String::new(),
            linkedin: String::new(),
            portfolio: String::new(),
            expected_salary: None,
            availability_date: None,
            additional_info: String::new(),
            resume_link: Some("https://drive/r".to_string()),
            created_at: None,
        }
    }

    #[test]
    fn applicants_are_scoped_to_last_requested_job() {
        let mut state = ApplicationsState::default();
        state.set_applicants_for_job(
            JobId::from("j-1"),
            vec![application("a-1", ApplicationStatus::Pending)],
        );
        state.set_applicants_for_job(JobId::from("j-2"), Vec::new());

        let applicants = state.applicants.as_ref().expect("applicants present");
        assert_eq!(applicants.job_id, JobId::from("j-2"));
        assert!(applicants.applications.is_empty());
        assert!(state.application(&ApplicationId::from("a-1")).is_none());
    }

    #[test]
    fn record_status_patches_pending_applications_only() {
        let mut state = ApplicationsState::default();
        state.set_applicants_for_job(
            JobId::from("j-1"),
            vec![
                application("a-1", ApplicationStatus::Pending),
                application("a-2", ApplicationStatus::Accepted),
            ],
        );

        assert_eq!(
            state.record_status(&ApplicationId::from("a-1"), StatusDecision::Rejected),
            Ok(true)
        );
        assert_eq!(
            state
                .application(&ApplicationId::from("a-1"))
                .map(|application| application.status),
            Some(ApplicationStatus::Rejected)
        );

        let err = state
            .record_status(&ApplicationId::from("a-2"), StatusDecision::Rejected)
            .expect_err("accepted is terminal");
        assert_eq!(err.current, ApplicationStatus::Accepted);
        assert_eq!(
            state
                .application(&ApplicationId::from("a-2"))
                .map(|application| application.status),
            Some(ApplicationStatus::Accepted)
        );

        assert_eq!(
            state.record_status(&ApplicationId::from("a-9"), StatusDecision::Accepted),
            Ok(false)
        );
    }

    #[test]
    fn summary_counts_each_status() {
        let mut state = ApplicationsState::default();
        state.set_applied_jobs(vec![
            application("a-1", ApplicationStatus::Pending),
            application("a-2", ApplicationStatus::Accepted),
            application("a-3", ApplicationStatus::Pending),
            application("a-4", ApplicationStatus::Rejected),
        ]);

        assert_eq!(
            state.summary(),
            ApplicationSummary {
                total: 4,
                pending: 2,
                accepted: 1,
                rejected: 1,
            }
        );
        assert_eq!(state.recent(2).len(), 2);
        assert_eq!(state.recent(10).len(), 4);
    }

    #[test]
    fn store_does_not_notify_for_unknown_application() {
        let store = ApplicationsStore::default();
        let mut receiver = store.subscribe();
        receiver.borrow_and_update();

        assert_eq!(
            store.record_status(&ApplicationId::from("a-1"), StatusDecision::Accepted),
            Ok(false)
        );
        assert!(!receiver.has_changed().expect("store alive"));
    }
}
