//! Remote portal API boundary.

mod http;
pub mod query;

use async_trait::async_trait;

use crate::domain::{
    Application, ApplicationForm, ApplicationId, Job, JobId, ProfileUpdate, StatusDecision, User,
};

pub use http::HttpPortalApi;
pub use query::JobQuery;

/// Confirmation carrying the server's replacement user document.
#[derive(Debug, Clone, PartialEq)]
pub struct UserChange {
    pub message: Option<String>,
    pub user: User,
}

/// Confirmation with only a server message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

/// Operations the sync layer needs from the portal server. Credentials are the
/// implementation's concern.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn fetch_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, ApiError>;
    async fn save_job(&self, job_id: &JobId) -> Result<UserChange, ApiError>;
    async fn apply(&self, job_id: &JobId, form: &ApplicationForm) -> Result<Ack, ApiError>;
    async fn applied_jobs(&self) -> Result<Vec<Application>, ApiError>;
    async fn applicants(&self, job_id: &JobId) -> Result<Vec<Application>, ApiError>;
    async fn update_status(
        &self,
        application_id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<Ack, ApiError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserChange, ApiError>;
    async fn delete_account(&self) -> Result<Ack, ApiError>;
    async fn logout(&self) -> Result<Ack, ApiError>;
}

/// Failures surfaced by a [`PortalApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("authentication required: {message}")]
    Unauthorized { message: String },
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("server reported failure: {message}")]
    Unsuccessful { message: String },
    /// `status` is set when a server or gateway reported the timeout.
    #[error("request timed out: {message}")]
    Timeout {
        status: Option<u16>,
        message: String,
    },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid response payload: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Message authored by the server, when there is one worth showing verbatim.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::Rejected { message, .. }
            | ApiError::Server { message, .. }
            | ApiError::Unsuccessful { message }
            | ApiError::Timeout {
                status: Some(_),
                message,
            } => Some(message.as_str()).filter(|message| !message.is_empty()),
            ApiError::Timeout { status: None, .. }
            | ApiError::Transport(_)
            | ApiError::Decode(_)
            | ApiError::InvalidRequest(_) => None,
        }
    }
}
