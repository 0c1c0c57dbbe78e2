use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use job_portal::domain::StatusDecision;
use job_portal::error::AppError;

use crate::commands::{self, Portal};
use crate::demo::{run_demo, DemoArgs};

#[derive(Parser, Debug)]
#[command(
    name = "portal",
    about = "Browse jobs, apply and review applicants against a job portal server",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List jobs matching the given filters (default command)
    Jobs(FilterArgs),
    /// Keep the job list in sync while filter commands are read from stdin
    Watch(FilterArgs),
    /// Show the signed-in student's applications with a status summary
    Applied,
    /// Save or unsave a job for the signed-in user
    Save {
        /// Job identifier
        job_id: String,
    },
    /// Apply to a job
    Apply(ApplyArgs),
    /// List applicants for one of the recruiter's jobs
    Applicants {
        /// Job identifier
        job_id: String,
        /// Also write the applicant list to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Accept or reject an application
    Status {
        /// Application identifier
        application_id: String,
        decision: Decision,
    },
    /// Update the signed-in user's profile
    Profile(ProfileArgs),
    /// End the session on the server and locally
    Logout,
    /// Permanently delete the signed-in account
    DeleteAccount,
    /// Run a scripted walkthrough against an in-memory portal
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Free-text search over titles and descriptions
    #[arg(long, default_value = "")]
    pub(crate) keyword: String,
    /// Exact location; "all" clears it
    #[arg(long, default_value = "")]
    pub(crate) location: String,
    /// Industry or role family; "all" clears it
    #[arg(long, default_value = "")]
    pub(crate) industry: String,
    /// Minimum salary in LPA
    #[arg(long)]
    pub(crate) salary_min: Option<f64>,
    /// Maximum salary in LPA
    #[arg(long)]
    pub(crate) salary_max: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct ApplyArgs {
    /// Job identifier
    pub(crate) job_id: String,
    #[arg(long, default_value = "")]
    pub(crate) cover_letter: String,
    #[arg(long, default_value = "")]
    pub(crate) resume_link: String,
    #[arg(long, default_value = "")]
    pub(crate) experience: String,
    /// Comma-separated skills
    #[arg(long, default_value = "")]
    pub(crate) skills: String,
    #[arg(long, default_value = "")]
    pub(crate) education: String,
    #[arg(long, default_value = "")]
    pub(crate) phone: String,
    #[arg(long, default_value = "")]
    pub(crate) linkedin: String,
    #[arg(long, default_value = "")]
    pub(crate) portfolio: String,
    /// Expected salary in LPA
    #[arg(long, default_value = "")]
    pub(crate) expected_salary: String,
    #[arg(long, default_value = "")]
    pub(crate) availability_date: String,
    #[arg(long, default_value = "")]
    pub(crate) additional_info: String,
}

/// Unset fields keep the cached user's current values.
#[derive(Args, Debug, Default)]
pub(crate) struct ProfileArgs {
    #[arg(long)]
    pub(crate) full_name: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
    #[arg(long)]
    pub(crate) phone_number: Option<String>,
    #[arg(long)]
    pub(crate) bio: Option<String>,
    /// Comma-separated skills
    #[arg(long)]
    pub(crate) skills: Option<String>,
    #[arg(long)]
    pub(crate) resume_link: Option<String>,
    /// Image file to upload as the profile photo
    #[arg(long)]
    pub(crate) photo: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Decision {
    Accepted,
    Rejected,
}

impl From<Decision> for StatusDecision {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Accepted => StatusDecision::Accepted,
            Decision::Rejected => StatusDecision::Rejected,
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Jobs(FilterArgs::default()));

    match command {
        Command::Demo(args) => run_demo(args).await,
        live => run_live(live).await,
    }
}

async fn run_live(command: Command) -> Result<(), AppError> {
    let portal = Portal::connect().await?;
    match command {
        Command::Jobs(args) => commands::list_jobs(&portal, args).await,
        Command::Watch(args) => commands::watch_jobs(&portal, args).await,
        Command::Applied => commands::applied_jobs(&portal).await,
        Command::Save { job_id } => commands::save_job(&portal, job_id).await,
        Command::Apply(args) => commands::apply(&portal, args).await,
        Command::Applicants { job_id, csv } => commands::applicants(&portal, job_id, csv).await,
        Command::Status {
            application_id,
            decision,
        } => commands::update_status(&portal, application_id, decision.into()).await,
        Command::Profile(args) => commands::update_profile(&portal, args).await,
        Command::Logout => commands::logout(&portal).await,
        Command::DeleteAccount => commands::delete_account(&portal).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_decision_and_csv_flag() {
        let cli = Cli::try_parse_from(["portal", "status", "app-1", "accepted"]).expect("parses");
        match cli.command {
            Some(Command::Status {
                application_id,
                decision: Decision::Accepted,
            }) => assert_eq!(application_id, "app-1"),
            other => panic!("expected status command, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["portal", "applicants", "job-1", "--csv", "out.csv"])
            .expect("parses");
        match cli.command {
            Some(Command::Applicants { job_id, csv }) => {
                assert_eq!(job_id, "job-1");
                assert_eq!(csv, Some(PathBuf::from("out.csv")));
            }
            other => panic!("expected applicants command, got {other:?}"),
        }
    }

    #[test]
    fn jobs_filters_default_to_unset() {
        let cli = Cli::try_parse_from(["portal", "jobs", "--location", "Pune"]).expect("parses");
        match cli.command {
            Some(Command::Jobs(args)) => {
                assert_eq!(args.location, "Pune");
                assert_eq!(args.keyword, "");
                assert_eq!(args.salary_min, None);
            }
            other => panic!("expected jobs command, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["portal"]).expect("parses").command.is_none());
    }
}
