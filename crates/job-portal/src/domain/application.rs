use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::user::parse_skills;
use super::{ApplicationId, Job, Reference, User};

/// Lifecycle of an application. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// Visual tone used when rendering a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Warning,
    Success,
    Danger,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub const fn tone(self) -> StatusTone {
        match self {
            ApplicationStatus::Pending => StatusTone::Warning,
            ApplicationStatus::Accepted => StatusTone::Success,
            ApplicationStatus::Rejected => StatusTone::Danger,
        }
    }

    /// Message shown to the applicant once a decision is in.
    pub const fn applicant_message(self) -> Option<&'static str> {
        match self {
            ApplicationStatus::Pending => None,
            ApplicationStatus::Accepted => {
                Some("Congratulations! Your application has been accepted.")
            }
            ApplicationStatus::Rejected => Some(
                "We appreciate your interest, but this position wasn't the right fit.",
            ),
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    pub fn apply(self, decision: StatusDecision) -> Result<Self, StatusTransitionError> {
        match self {
            ApplicationStatus::Pending => Ok(decision.into()),
            terminal => Err(StatusTransitionError { current: terminal }),
        }
    }
}

/// Recruiter decision. Serialized the way the status endpoint expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusDecision {
    Accepted,
    Rejected,
}

impl From<StatusDecision> for ApplicationStatus {
    fn from(value: StatusDecision) -> Self {
        match value {
            StatusDecision::Accepted => ApplicationStatus::Accepted,
            StatusDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("application is already {} and cannot change", .current.label().to_lowercase())]
pub struct StatusTransitionError {
    pub current: ApplicationStatus,
}

/// Submitted application as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
    pub job: Reference<Job>,
    pub applicant: Reference<User>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default, deserialize_with = "list_or_comma_separated")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub portfolio: String,
    #[serde(
        default,
        deserialize_with = "number_or_numeric_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_date: Option<String>,
    #[serde(default)]
    pub additional_info: String,
    #[serde(default, rename = "resume", skip_serializing_if = "Option::is_none")]
    pub resume_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn list_or_comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::List(items)) => items,
        Some(Raw::Text(text)) => parse_skills(&text),
        None => Vec::new(),
    })
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(value)) => Some(value),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// Body of `POST /application/apply/:jobId`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub resume_link: String,
    pub cover_letter: String,
    pub experience: String,
    pub skills: String,
    pub education: String,
    pub phone: String,
    pub linkedin: String,
    pub portfolio: String,
    pub expected_salary: String,
    pub availability_date: String,
    pub additional_info: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationFormError {
    #[error("Cover letter is required")]
    MissingCoverLetter,
    #[error("Resume link is required")]
    MissingResumeLink,
}

impl ApplicationForm {
    /// Checked before any request is sent; the cover letter is checked first.
    pub fn validate(&self) -> Result<(), ApplicationFormError> {
        if self.cover_letter.trim().is_empty() {
            return Err(ApplicationFormError::MissingCoverLetter);
        }
        if self.resume_link.trim().is_empty() {
            return Err(ApplicationFormError::MissingResumeLink);
        }
        Ok(())
    }
}
