use chrono::{DateTime, Utc};
use job_portal::domain::{Application, Job};
use job_portal::store::{ApplicationsState, SavedJobs};

pub(crate) fn job_line(job: &Job, saved: bool, now: DateTime<Utc>) -> String {
    let marker = if saved { '*' } else { ' ' };
    let company = job.company_name().unwrap_or("Unknown company");
    format!(
        "{marker} {id:<10} {title} at {company} | {location} | {kind} | {min}-{max} LPA | {posted}",
        id = job.id,
        title = job.title,
        location = job.location,
        kind = job.job_type,
        min = job.salary_range.min,
        max = job.salary_range.max,
        posted = job.posted_label(now),
    )
}

pub(crate) fn print_jobs(jobs: &[Job], saved: &SavedJobs, now: DateTime<Utc>) {
    if jobs.is_empty() {
        println!("  No jobs match the current filters");
        return;
    }
    for job in jobs {
        println!("  {}", job_line(job, saved.contains(&job.id), now));
    }
}

fn job_title(application: &Application) -> String {
    application
        .job
        .populated()
        .map(|job| job.title.clone())
        .unwrap_or_else(|| application.job.id().to_string())
}

pub(crate) fn application_line(application: &Application) -> String {
    let mut line = format!(
        "{id:<10} {title} [{status}]",
        id = application.id,
        title = job_title(application),
        status = application.status.label(),
    );
    if let Some(message) = application.status.applicant_message() {
        line.push_str(" - ");
        line.push_str(message);
    }
    line
}

/// Student dashboard: counts first, then the most recent applications.
pub(crate) fn print_applied(state: &ApplicationsState, limit: usize) {
    let summary = state.summary();
    println!(
        "  Total: {}  Pending: {}  Accepted: {}  Rejected: {}",
        summary.total, summary.pending, summary.accepted, summary.rejected
    );
    for application in state.recent(limit) {
        println!("  {}", application_line(application));
    }
}

pub(crate) fn print_applicants(applications: &[Application]) {
    if applications.is_empty() {
        println!("  No applications yet");
        return;
    }
    for application in applications {
        let (name, email) = application
            .applicant
            .populated()
            .map(|user| (user.full_name.as_str(), user.email.as_str()))
            .unwrap_or(("Unknown applicant", ""));
        println!(
            "  {id:<10} {name} <{email}> [{status}] resume: {resume}",
            id = application.id,
            status = application.status.label(),
            resume = application.resume_link.as_deref().unwrap_or("-"),
        );
    }
}
