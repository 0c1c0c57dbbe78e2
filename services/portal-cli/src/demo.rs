use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use job_portal::domain::{
    ApplicationForm, Company, Job, JobId, Profile, Reference, SalaryRange, StatusDecision, User,
    UserId, UserRole,
};
use job_portal::error::AppError;
use job_portal::export::write_applicants_csv;
use job_portal::store::{ApplicationsState, Stores};
use job_portal::PortalClient;

use crate::infra::{reference_time, ConsoleNotifier, InMemoryPortalApi};
use crate::render;

pub(crate) const STUDENT_ID: &str = "u-student";
pub(crate) const RECRUITER_ID: &str = "u-recruiter";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for "posted N days ago" labels (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the recruiter's applicant export as CSV.
    #[arg(long)]
    pub(crate) csv: bool,
}

type DemoClient = PortalClient<InMemoryPortalApi, ConsoleNotifier>;

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.today.map(reference_time).unwrap_or_else(Utc::now);
    let api = Arc::new(InMemoryPortalApi::new(seed_jobs(now), seed_users()));
    let client = Arc::new(PortalClient::new(Arc::clone(&api), Arc::new(ConsoleNotifier)));
    let stores = client.stores();

    println!("Job portal demo");
    println!("\nBrowsing as a guest");
    client.refresh_jobs().await?;
    show_jobs(stores, now);

    println!("\nFiltering by location with the job watcher running");
    let watcher = client.watch_jobs();
    stores.filters.set_location("Bangalore");
    settle(stores, |state| {
        !state.jobs.is_empty() && state.jobs.iter().all(|job| job.location == "Bangalore")
    })
    .await;
    show_jobs(stores, now);
    stores.filters.set_salary_range(25.0, f64::INFINITY);
    settle(stores, |state| {
        state.jobs.iter().all(|job| job.salary_range.max >= 25.0)
    })
    .await;
    println!("  With a 25 LPA minimum:");
    show_jobs(stores, now);
    drop(watcher);

    println!("\nStudent session");
    stores.session.set_user(api.sign_in(&UserId::from(STUDENT_ID)));
    let target = JobId::from("job-blr-platform");
    client.toggle_saved_job(&target).await?;
    client.refresh_jobs().await?;
    show_jobs(stores, now);

    println!("  Applying without a cover letter:");
    let incomplete = ApplicationForm {
        resume_link: "https://example.com/ananya-resume.pdf".to_string(),
        ..ApplicationForm::default()
    };
    if client.submit_application(&target, &incomplete).await.is_err() {
        println!("  (rejected before any request was sent)");
    }

    println!("  Applying with a complete form:");
    let form = ApplicationForm {
        cover_letter: "I have run Kubernetes platforms for three years.".to_string(),
        experience: "3 years".to_string(),
        skills: "rust, kubernetes, terraform".to_string(),
        expected_salary: "24".to_string(),
        linkedin: "https://linkedin.com/in/ananya".to_string(),
        ..incomplete
    };
    client.submit_application(&target, &form).await?;
    println!("  Applying to the same job again:");
    if client.submit_application(&target, &form).await.is_err() {
        println!("  (duplicate application refused by the server)");
    }
    client.load_applied_jobs().await?;
    render::print_applied(&stores.applications.snapshot(), 5);

    println!("\nRecruiter session");
    client.logout().await?;
    stores.session.set_user(api.sign_in(&UserId::from(RECRUITER_ID)));
    client.load_applicants(&target).await?;
    let applicants = applicant_list(&client);
    render::print_applicants(&applicants);

    if let Some(first) = applicants.first() {
        client.update_status(&first.id, StatusDecision::Accepted).await?;
        println!("  Trying to reject an accepted application:");
        if client
            .update_status(&first.id, StatusDecision::Rejected)
            .await
            .is_err()
        {
            println!("  (decided applications cannot change)");
        }
        render::print_applicants(&applicant_list(&client));
    }

    if args.csv {
        println!("\nApplicant export");
        let mut out = Vec::new();
        write_applicants_csv(&applicant_list(&client), &mut out)?;
        print!("{}", String::from_utf8_lossy(&out));
    }

    println!("\nStudent checks the dashboard");
    client.logout().await?;
    stores.session.set_user(api.sign_in(&UserId::from(STUDENT_ID)));
    client.load_applied_jobs().await?;
    render::print_applied(&stores.applications.snapshot(), 5);
    client.logout().await?;

    Ok(())
}

fn show_jobs(stores: &Stores, now: DateTime<Utc>) {
    let session = stores.session.snapshot();
    render::print_jobs(&stores.applications.snapshot().jobs, &session.saved_jobs, now);
}

fn applicant_list(client: &DemoClient) -> Vec<job_portal::domain::Application> {
    client
        .stores()
        .applications
        .snapshot()
        .applicants
        .map(|applicants| applicants.applications)
        .unwrap_or_default()
}

/// Wait for the watcher to write a job list matching `ready`.
async fn settle(stores: &Stores, ready: impl Fn(&ApplicationsState) -> bool) {
    let mut updates = stores.applications.subscribe();
    let waited =
        tokio::time::timeout(Duration::from_secs(2), updates.wait_for(|state| ready(state))).await;
    if !matches!(waited, Ok(Ok(_))) {
        println!("  (job list did not refresh in time)");
    }
}

fn posted(id: &str, title: &str, company: &str, location: &str) -> Job {
    Job {
        id: JobId::from(id),
        title: title.to_string(),
        description: format!("{title} role at {company}"),
        requirements: Vec::new(),
        company: Some(Reference::Populated(Box::new(Company {
            id: None,
            name: company.to_string(),
            logo: None,
        }))),
        location: location.to_string(),
        positions: 1,
        job_type: "Full-time".to_string(),
        experience_level: None,
        salary_range: SalaryRange::default(),
        created_at: None,
    }
}

pub(crate) fn seed_jobs(now: DateTime<Utc>) -> Vec<Job> {
    let days_ago = |days: i64| Some(now - chrono::Duration::days(days));
    vec![
        Job {
            requirements: vec!["kubernetes".to_string(), "rust".to_string()],
            positions: 2,
            experience_level: Some(3.0),
            salary_range: SalaryRange {
                min: 18.0,
                max: 30.0,
            },
            created_at: days_ago(0),
            ..posted(
                "job-blr-platform",
                "Platform Engineer",
                "Acme Cloud",
                "Bangalore",
            )
        },
        Job {
            salary_range: SalaryRange {
                min: 8.0,
                max: 14.0,
            },
            created_at: days_ago(1),
            ..posted("job-blr-frontend", "Frontend Developer", "Pixel Works", "Bangalore")
        },
        Job {
            salary_range: SalaryRange {
                min: 12.0,
                max: 22.0,
            },
            job_type: "Remote".to_string(),
            created_at: days_ago(6),
            ..posted("job-pune-data", "Data Science Analyst", "Numbers Co", "Pune")
        },
        Job {
            salary_range: SalaryRange {
                min: 20.0,
                max: 35.0,
            },
            created_at: days_ago(12),
            ..posted("job-hyd-devops", "DevOps Engineer", "ShipFast", "Hyderabad")
        },
    ]
}

pub(crate) fn seed_users() -> Vec<User> {
    vec![
        User {
            id: UserId::from(STUDENT_ID),
            full_name: "Ananya Sharma".to_string(),
            email: "ananya@example.com".to_string(),
            phone_number: Some("9876543210".to_string()),
            role: UserRole::Student,
            profile: Profile {
                skills: vec!["rust".to_string(), "kubernetes".to_string()],
                ..Profile::default()
            },
        },
        User {
            id: UserId::from(RECRUITER_ID),
            full_name: "Vikram Rao".to_string(),
            email: "vikram@acme.example".to_string(),
            phone_number: None,
            role: UserRole::Recruiter,
            profile: Profile::default(),
        },
    ]
}
