use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use job_portal::api::{Ack, JobQuery, UserChange};
use job_portal::domain::user::parse_skills;
use job_portal::domain::{
    Application, ApplicationForm, ApplicationId, ApplicationStatus, Job, JobId, ProfileUpdate,
    Reference, StatusDecision, User, UserId, UserRole,
};
use job_portal::error::AppError;
use job_portal::{ApiError, Notification, NotificationLevel, Notifier, PortalApi, Route};

/// Caches the signed-in user between command invocations.
#[derive(Debug, Clone)]
pub(crate) struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) async fn load(&self) -> Result<Option<User>, AppError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the user, or removes the cache when signed out.
    pub(crate) async fn store(&self, user: Option<&User>) -> Result<(), AppError> {
        match user {
            Some(user) => {
                let json = serde_json::to_vec_pretty(user)?;
                tokio::fs::write(&self.path, json).await?;
            }
            None => match tokio::fs::remove_file(&self.path).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            },
        }
        Ok(())
    }
}

/// Prints notifications for a terminal user.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        println!("{}", notification_line(&notification));
    }
}

pub(crate) fn notification_line(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    match notification.redirect {
        Some(route) => format!(
            "[{marker}] {} (next: {})",
            notification.message,
            route_label(route)
        ),
        None => format!("[{marker}] {}", notification.message),
    }
}

fn route_label(route: Route) -> &'static str {
    match route {
        Route::Home => "home",
        Route::Login => "login",
        Route::Signup => "signup",
        Route::AppliedJobs => "applied jobs",
    }
}

#[derive(Debug, Default)]
struct PortalState {
    jobs: Vec<Job>,
    users: Vec<User>,
    applications: Vec<Application>,
    signed_in: Option<UserId>,
    next_application: u64,
}

impl PortalState {
    fn current_user(&mut self) -> Result<&mut User, ApiError> {
        let id = self.signed_in.clone().ok_or_else(unauthenticated)?;
        self.users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(unauthenticated)
    }
}

fn unauthenticated() -> ApiError {
    ApiError::Unauthorized {
        message: "User not authenticated".to_string(),
    }
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: message.to_string(),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_query(job: &Job, query: &JobQuery) -> bool {
    let keyword = query.keyword.as_str();
    let keyword_matches = keyword.is_empty()
        || contains_ignore_case(&job.title, keyword)
        || contains_ignore_case(&job.description, keyword);
    let location_matches = query
        .location
        .as_deref()
        .map_or(true, |location| job.location.eq_ignore_ascii_case(location));
    let industry_matches = query
        .industry
        .as_deref()
        .map_or(true, |industry| contains_ignore_case(&job.title, industry));
    let min_matches = query
        .salary_min
        .map_or(true, |min| job.salary_range.max >= min);
    let max_matches = query
        .salary_max
        .map_or(true, |max| job.salary_range.min <= max);

    keyword_matches && location_matches && industry_matches && min_matches && max_matches
}

/// Portal server kept in memory, used by the demo and tests.
#[derive(Debug, Default)]
pub(crate) struct InMemoryPortalApi {
    state: Mutex<PortalState>,
}

impl InMemoryPortalApi {
    pub(crate) fn new(jobs: Vec<Job>, users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(PortalState {
                jobs,
                users,
                ..PortalState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, PortalState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Stand-in for the login flow, which lives outside this client.
    pub(crate) fn sign_in(&self, user_id: &UserId) -> Option<User> {
        let mut state = self.state();
        let user = state.users.iter().find(|user| &user.id == user_id)?.clone();
        state.signed_in = Some(user.id.clone());
        Some(user)
    }
}

#[async_trait]
impl PortalApi for InMemoryPortalApi {
    async fn fetch_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, ApiError> {
        Ok(self
            .state()
            .jobs
            .iter()
            .filter(|job| matches_query(job, query))
            .cloned()
            .collect())
    }

    async fn save_job(&self, job_id: &JobId) -> Result<UserChange, ApiError> {
        let mut state = self.state();
        let user = state.current_user()?;
        let saved = &mut user.profile.saved_jobs;
        let message = match saved.iter().position(|id| id == job_id) {
            Some(position) => {
                saved.remove(position);
                "Job removed from saved jobs"
            }
            None => {
                saved.push(job_id.clone());
                "Job saved successfully"
            }
        };
        Ok(UserChange {
            message: Some(message.to_string()),
            user: user.clone(),
        })
    }

    async fn apply(&self, job_id: &JobId, form: &ApplicationForm) -> Result<Ack, ApiError> {
        let mut state = self.state();
        let applicant = state.current_user()?.clone();
        let job = state
            .jobs
            .iter()
            .find(|job| &job.id == job_id)
            .cloned()
            .ok_or_else(|| rejected(404, "Job not found"))?;
        let duplicate = state.applications.iter().any(|application| {
            &application.job.id() == job_id && application.applicant.id() == applicant.id
        });
        if duplicate {
            return Err(rejected(400, "You have already applied for this job"));
        }

        state.next_application += 1;
        let id = ApplicationId(format!("app-{:04}", state.next_application));
        state.applications.push(Application {
            id,
            job: Reference::Populated(Box::new(job)),
            applicant: Reference::Populated(Box::new(applicant)),
            status: ApplicationStatus::Pending,
            cover_letter: form.cover_letter.clone(),
            experience: form.experience.clone(),
            skills: parse_skills(&form.skills),
            education: form.education.clone(),
            phone: form.phone.clone(),
            linkedin: form.linkedin.clone(),
            portfolio: form.portfolio.clone(),
            expected_salary: form.expected_salary.trim().parse().ok(),
            availability_date: Some(form.availability_date.clone())
                .filter(|date| !date.trim().is_empty()),
            additional_info: form.additional_info.clone(),
            resume_link: Some(form.resume_link.clone()),
            created_at: Some(Utc::now()),
        });
        Ok(Ack {
            message: Some("Job applied successfully.".to_string()),
        })
    }

    async fn applied_jobs(&self) -> Result<Vec<Application>, ApiError> {
        let mut state = self.state();
        let user_id = state.current_user()?.id.clone();
        let mut applied: Vec<Application> = state
            .applications
            .iter()
            .filter(|application| application.applicant.id() == user_id)
            .cloned()
            .collect();
        applied.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applied)
    }

    async fn applicants(&self, job_id: &JobId) -> Result<Vec<Application>, ApiError> {
        let mut state = self.state();
        if state.current_user()?.role != UserRole::Recruiter {
            return Err(rejected(403, "Only recruiters can view applicants"));
        }
        Ok(state
            .applications
            .iter()
            .filter(|application| &application.job.id() == job_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        application_id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<Ack, ApiError> {
        let mut state = self.state();
        if state.current_user()?.role != UserRole::Recruiter {
            return Err(rejected(403, "Only recruiters can update applications"));
        }
        let application = state
            .applications
            .iter_mut()
            .find(|application| &application.id == application_id)
            .ok_or_else(|| rejected(404, "Application not found"))?;
        application.status = application
            .status
            .apply(decision)
            .map_err(|err| rejected(400, &err.to_string()))?;
        Ok(Ack {
            message: Some("Status updated successfully.".to_string()),
        })
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserChange, ApiError> {
        let mut state = self.state();
        let user = state.current_user()?;
        user.full_name = update.full_name.clone();
        user.email = update.email.clone();
        user.phone_number = Some(update.phone_number.clone()).filter(|phone| !phone.is_empty());
        user.profile.bio = Some(update.bio.clone()).filter(|bio| !bio.is_empty());
        user.profile.skills = update.skills.clone();
        user.profile.resume = Some(update.resume_link.clone()).filter(|link| !link.is_empty());
        if let Some(photo) = &update.profile_photo {
            user.profile.profile_photo = Some(format!("memory://photos/{}", photo.file_name));
        }
        Ok(UserChange {
            message: Some("Profile updated successfully.".to_string()),
            user: user.clone(),
        })
    }

    async fn delete_account(&self) -> Result<Ack, ApiError> {
        let mut state = self.state();
        let user_id = state.current_user()?.id.clone();
        state.users.retain(|user| user.id != user_id);
        state
            .applications
            .retain(|application| application.applicant.id() != user_id);
        state.signed_in = None;
        Ok(Ack {
            message: Some("Account deleted successfully.".to_string()),
        })
    }

    async fn logout(&self) -> Result<Ack, ApiError> {
        self.state().signed_in = None;
        Ok(Ack {
            message: Some("Logged out successfully.".to_string()),
        })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Noon UTC on `date`, the reference point for "posted N days ago" labels.
pub(crate) fn reference_time(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0)
        .map(|time| time.and_utc())
        .unwrap_or_else(Utc::now)
}
