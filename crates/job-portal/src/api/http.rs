//! Reqwest-backed portal API client.
//!
//! Owns transport details only: URL building, the session cookie, the
//! `{success, message, ...}` envelope and HTTP error mapping.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{Ack, ApiError, JobQuery, PortalApi, UserChange};
use crate::config::ApiConfig;
use crate::domain::{
    Application, ApplicationForm, ApplicationId, Job, JobId, ProfileUpdate, StatusDecision, User,
};

const SESSION_COOKIE: &str = "token";

#[derive(Debug, Deserialize)]
struct Outcome {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobsPayload {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    user: User,
}

#[derive(Debug, Deserialize)]
struct AppliedPayload {
    #[serde(default)]
    application: Vec<Application>,
}

#[derive(Debug, Deserialize)]
struct ApplicantsPayload {
    job: ApplicantsJob,
}

#[derive(Debug, Deserialize)]
struct ApplicantsJob {
    #[serde(default)]
    applications: Vec<Application>,
}

/// Portal API client over HTTP. Credentials travel in a cookie jar, so a
/// server-issued `token` cookie is kept for later requests.
#[derive(Debug, Clone)]
pub struct HttpPortalApi {
    client: Client,
    base_url: Url,
}

impl HttpPortalApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        if let Some(token) = &config.session_token {
            jar.add_cookie_str(&format!("{SESSION_COOKIE}={token}"), &config.base_url);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_provider(jar)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::InvalidRequest(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send and check both the HTTP status and the envelope's `success` flag.
    async fn confirmed(&self, request: RequestBuilder) -> Result<(Outcome, Vec<u8>), ApiError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(map_transport_error)?
            .to_vec();

        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }

        let outcome: Outcome = serde_json::from_slice(&body)
            .map_err(|err| ApiError::Decode(format!("invalid envelope: {err}")))?;
        if !outcome.success {
            return Err(ApiError::Unsuccessful {
                message: outcome.message.unwrap_or_default(),
            });
        }
        Ok((outcome, body))
    }

    async fn payload<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(Option<String>, T), ApiError> {
        let (outcome, body) = self.confirmed(request).await?;
        let payload = serde_json::from_slice(&body)
            .map_err(|err| ApiError::Decode(format!("invalid payload: {err}")))?;
        Ok((outcome.message, payload))
    }

    async fn ack(&self, request: RequestBuilder) -> Result<Ack, ApiError> {
        let (outcome, _) = self.confirmed(request).await?;
        Ok(Ack {
            message: outcome.message,
        })
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn fetch_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, ApiError> {
        let url = self.endpoint(&["job", "get"])?;
        debug!(%url, ?query, "fetching jobs");
        let request = self.client.get(url).query(&query.pairs());
        let (_, payload): (_, JobsPayload) = self.payload(request).await?;
        Ok(payload.jobs)
    }

    async fn save_job(&self, job_id: &JobId) -> Result<UserChange, ApiError> {
        let url = self.endpoint(&["user", "save-job", job_id.as_str()])?;
        let request = self.client.post(url).json(&json!({}));
        let (message, payload): (_, UserPayload) = self.payload(request).await?;
        Ok(UserChange {
            message,
            user: payload.user,
        })
    }

    async fn apply(&self, job_id: &JobId, form: &ApplicationForm) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["application", "apply", job_id.as_str()])?;
        self.ack(self.client.post(url).json(form)).await
    }

    async fn applied_jobs(&self) -> Result<Vec<Application>, ApiError> {
        let url = self.endpoint(&["application", "get"])?;
        let (_, payload): (_, AppliedPayload) = self.payload(self.client.get(url)).await?;
        Ok(payload.application)
    }

    async fn applicants(&self, job_id: &JobId) -> Result<Vec<Application>, ApiError> {
        let url = self.endpoint(&["application", job_id.as_str(), "applicants"])?;
        let (_, payload): (_, ApplicantsPayload) = self.payload(self.client.get(url)).await?;
        Ok(payload.job.applications)
    }

    async fn update_status(
        &self,
        application_id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["application", "status", application_id.as_str(), "update"])?;
        let request = self.client.post(url).json(&json!({ "status": decision }));
        self.ack(request).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserChange, ApiError> {
        let url = self.endpoint(&["user", "profile", "update"])?;
        let mut form = Form::new()
            .text("fullname", update.full_name.clone())
            .text("email", update.email.clone())
            .text("phoneNumber", update.phone_number.clone())
            .text("bio", update.bio.clone())
            .text("skills", update.skills_field())
            .text("resumeLink", update.resume_link.clone());

        if let Some(photo) = &update.profile_photo {
            let content_type = photo.content_type();
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(content_type.as_ref())
                .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
            form = form.part("profilePhoto", part);
        }

        let (message, payload): (_, UserPayload) =
            self.payload(self.client.post(url).multipart(form)).await?;
        Ok(UserChange {
            message,
            user: payload.user,
        })
    }

    async fn delete_account(&self) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["user", "profile", "delete"])?;
        self.ack(self.client.delete(url)).await
    }

    async fn logout(&self) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["user", "logout"])?;
        self.ack(self.client.get(url)).await
    }
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout {
            status: None,
            message: error.to_string(),
        }
    } else {
        ApiError::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ApiError::Timeout {
            status: Some(status.as_u16()),
            message,
        },
        _ if status.is_client_error() => ApiError::Rejected {
            status: status.as_u16(),
            message,
        },
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

/// Prefer the envelope's `message`; fall back to a compact body preview.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    if let Ok(Outcome {
        message: Some(message),
        ..
    }) = serde_json::from_slice::<Outcome>(body)
    {
        return message;
    }

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
}
