//! CSV export of a recruiter's applicant list.

use std::io::Write;

use serde::Serialize;

use crate::domain::Application;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ApplicantRow<'a> {
    #[serde(rename = "Application ID")]
    application_id: &'a str,
    #[serde(rename = "Applicant")]
    applicant: &'a str,
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Expected Salary (LPA)")]
    expected_salary: Option<f64>,
    #[serde(rename = "Resume")]
    resume: &'a str,
    #[serde(rename = "LinkedIn")]
    linkedin: &'a str,
    #[serde(rename = "Portfolio")]
    portfolio: &'a str,
    #[serde(rename = "Submitted")]
    submitted: String,
}

impl<'a> From<&'a Application> for ApplicantRow<'a> {
    fn from(application: &'a Application) -> Self {
        let applicant = application.applicant.populated();
        Self {
            application_id: application.id.as_str(),
            applicant: applicant.map_or("", |user| user.full_name.as_str()),
            email: applicant.map_or("", |user| user.email.as_str()),
            status: application.status.label(),
            expected_salary: application.expected_salary,
            resume: application.resume_link.as_deref().unwrap_or_default(),
            linkedin: &application.linkedin,
            portfolio: &application.portfolio,
            submitted: application
                .created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Write one header row and one row per application. Applicants that were not
/// populated by the server get empty name and email cells.
pub fn write_applicants_csv<W: Write>(
    applications: &[Application],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if applications.is_empty() {
        csv_writer.write_record([
            "Application ID",
            "Applicant",
            "Email",
            "Status",
            "Expected Salary (LPA)",
            "Resume",
            "LinkedIn",
            "Portfolio",
            "Submitted",
        ])?;
    }
    for application in applications {
        csv_writer.serialize(ApplicantRow::from(application))?;
    }
    csv_writer.flush()?;
    Ok(())
}
