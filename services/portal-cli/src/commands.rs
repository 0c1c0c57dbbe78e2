use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use job_portal::config::AppConfig;
use job_portal::domain::user::parse_skills;
use job_portal::domain::{
    ApplicationForm, ApplicationId, JobId, ProfilePhoto, ProfileUpdate, StatusDecision,
};
use job_portal::error::AppError;
use job_portal::export::write_applicants_csv;
use job_portal::store::FilterStore;
use job_portal::{telemetry, HttpPortalApi, PortalClient, SyncOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::cli::{ApplyArgs, FilterArgs, ProfileArgs};
use crate::infra::{ConsoleNotifier, SessionFile};
use crate::render;

const DASHBOARD_LIMIT: usize = 10;

/// Live client wired to the configured portal server and the session cache.
pub(crate) struct Portal {
    client: Arc<PortalClient<HttpPortalApi, ConsoleNotifier>>,
    session_file: SessionFile,
}

impl Portal {
    pub(crate) async fn connect() -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;

        let api = HttpPortalApi::new(&config.api)?;
        let client = Arc::new(PortalClient::new(Arc::new(api), Arc::new(ConsoleNotifier)));
        let session_file = SessionFile::new(config.session.cache_path.clone());
        if let Some(user) = session_file.load().await? {
            client.stores().session.set_user(Some(user));
        }

        info!(
            environment = ?config.environment,
            base_url = %config.api.base_url,
            signed_in = client.stores().session.current_user().is_some(),
            "portal client ready"
        );
        Ok(Self {
            client,
            session_file,
        })
    }

    /// Mirror the session store into the cache file.
    async fn persist_session(&self) -> Result<(), AppError> {
        let user = self.client.stores().session.current_user();
        self.session_file.store(user.as_ref()).await
    }
}

fn apply_filters(filters: &FilterStore, args: FilterArgs) {
    filters.set_keyword(&args.keyword);
    filters.set_location(&args.location);
    filters.set_industry(&args.industry);
    filters.set_salary_range(
        args.salary_min.unwrap_or(0.0),
        args.salary_max.unwrap_or(f64::INFINITY),
    );
}

fn print_job_list(portal: &Portal) {
    let stores = portal.client.stores();
    let session = stores.session.snapshot();
    render::print_jobs(
        &stores.applications.snapshot().jobs,
        &session.saved_jobs,
        Utc::now(),
    );
}

pub(crate) async fn list_jobs(portal: &Portal, args: FilterArgs) -> Result<(), AppError> {
    apply_filters(&portal.client.stores().filters, args);
    portal.client.refresh_jobs().await?;
    print_job_list(portal);
    Ok(())
}

/// One line of `watch` input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FilterCommand {
    Keyword(String),
    Location(String),
    Industry(String),
    Salary { min: f64, max: f64 },
    Clear,
    Reset,
    Quit,
}

pub(crate) fn parse_filter_command(line: &str) -> Result<FilterCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match verb.to_ascii_lowercase().as_str() {
        "keyword" => Ok(FilterCommand::Keyword(rest.to_string())),
        "location" => Ok(FilterCommand::Location(rest.to_string())),
        "industry" => Ok(FilterCommand::Industry(rest.to_string())),
        "salary" => {
            let mut bounds = rest.split_whitespace();
            let min = parse_bound(bounds.next(), 0.0)?;
            let max = parse_bound(bounds.next(), f64::INFINITY)?;
            Ok(FilterCommand::Salary { min, max })
        }
        "clear" => Ok(FilterCommand::Clear),
        "reset" => Ok(FilterCommand::Reset),
        "quit" | "exit" => Ok(FilterCommand::Quit),
        other => Err(format!(
            "unknown command '{other}'; use keyword, location, industry, salary, clear, reset or quit"
        )),
    }
}

fn parse_bound(raw: Option<&str>, default: f64) -> Result<f64, String> {
    match raw {
        None | Some("-") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| format!("'{value}' is not a salary in LPA")),
    }
}

/// Returns whether the filters changed.
fn apply_filter_command(filters: &FilterStore, command: FilterCommand) -> bool {
    match command {
        FilterCommand::Keyword(keyword) => filters.set_keyword(&keyword),
        FilterCommand::Location(location) => filters.set_location(&location),
        FilterCommand::Industry(industry) => filters.set_industry(&industry),
        FilterCommand::Salary { min, max } => filters.set_salary_range(min, max),
        FilterCommand::Clear => filters.clear_refinements(),
        FilterCommand::Reset => filters.reset(),
        FilterCommand::Quit => false,
    }
}

pub(crate) async fn watch_jobs(portal: &Portal, args: FilterArgs) -> Result<(), AppError> {
    let stores = portal.client.stores();
    apply_filters(&stores.filters, args);

    let mut updates = stores.applications.subscribe();
    let _watcher = portal.client.watch_jobs();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Watching jobs; type keyword/location/industry/salary/clear/reset/quit");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("Jobs for {:?}", stores.filters.snapshot());
                print_job_list(portal);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_filter_command(&line) {
                    Ok(FilterCommand::Quit) => break,
                    Ok(command) => {
                        if !apply_filter_command(&stores.filters, command) {
                            println!("Filters unchanged");
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
        }
    }
    Ok(())
}

pub(crate) async fn applied_jobs(portal: &Portal) -> Result<(), AppError> {
    match portal.client.load_applied_jobs().await? {
        SyncOutcome::Skipped => println!("Not signed in; no applications to show"),
        _ => render::print_applied(
            &portal.client.stores().applications.snapshot(),
            DASHBOARD_LIMIT,
        ),
    }
    Ok(())
}

pub(crate) async fn save_job(portal: &Portal, job_id: String) -> Result<(), AppError> {
    portal.client.toggle_saved_job(&JobId(job_id)).await?;
    portal.persist_session().await
}

pub(crate) async fn apply(portal: &Portal, args: ApplyArgs) -> Result<(), AppError> {
    let job_id = JobId(args.job_id);
    let form = ApplicationForm {
        resume_link: args.resume_link,
        cover_letter: args.cover_letter,
        experience: args.experience,
        skills: args.skills,
        education: args.education,
        phone: args.phone,
        linkedin: args.linkedin,
        portfolio: args.portfolio,
        expected_salary: args.expected_salary,
        availability_date: args.availability_date,
        additional_info: args.additional_info,
    };
    portal.client.submit_application(&job_id, &form).await?;
    applied_jobs(portal).await
}

pub(crate) async fn applicants(
    portal: &Portal,
    job_id: String,
    csv: Option<PathBuf>,
) -> Result<(), AppError> {
    let outcome = portal.client.load_applicants(&JobId(job_id)).await?;
    if outcome == SyncOutcome::Skipped {
        println!("Only recruiters can view applicants");
        return Ok(());
    }

    let applications = portal
        .client
        .stores()
        .applications
        .snapshot()
        .applicants
        .map(|applicants| applicants.applications)
        .unwrap_or_default();
    render::print_applicants(&applications);

    if let Some(path) = csv {
        let mut out = Vec::new();
        write_applicants_csv(&applications, &mut out)?;
        tokio::fs::write(&path, out).await?;
        println!("Wrote {} applicants to {}", applications.len(), path.display());
    }
    Ok(())
}

pub(crate) async fn update_status(
    portal: &Portal,
    application_id: String,
    decision: StatusDecision,
) -> Result<(), AppError> {
    portal
        .client
        .update_status(&ApplicationId(application_id), decision)
        .await?;
    Ok(())
}

pub(crate) async fn update_profile(portal: &Portal, args: ProfileArgs) -> Result<(), AppError> {
    let mut update = portal
        .client
        .stores()
        .session
        .current_user()
        .map(|user| ProfileUpdate::from_user(&user))
        .unwrap_or_default();

    if let Some(full_name) = args.full_name {
        update.full_name = full_name;
    }
    if let Some(email) = args.email {
        update.email = email;
    }
    if let Some(phone_number) = args.phone_number {
        update.phone_number = phone_number;
    }
    if let Some(bio) = args.bio {
        update.bio = bio;
    }
    if let Some(skills) = args.skills {
        update.skills = parse_skills(&skills);
    }
    if let Some(resume_link) = args.resume_link {
        update.resume_link = resume_link;
    }
    if let Some(path) = args.photo {
        let bytes = tokio::fs::read(&path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        update.profile_photo = Some(ProfilePhoto { file_name, bytes });
    }

    portal.client.update_profile(&update).await?;
    portal.persist_session().await
}

/// The cache is cleared even when the server call fails.
pub(crate) async fn logout(portal: &Portal) -> Result<(), AppError> {
    let result = portal.client.logout().await;
    portal.persist_session().await?;
    result.map_err(AppError::from)
}

pub(crate) async fn delete_account(portal: &Portal) -> Result<(), AppError> {
    portal.client.delete_account().await?;
    portal.persist_session().await
}
