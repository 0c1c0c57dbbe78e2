//! `HttpPortalApi` against a local axum stub of the portal server.

mod common {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, RawQuery, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use url::Url;

    use job_portal::config::ApiConfig;
    use job_portal::HttpPortalApi;

    pub(super) const TOKEN: &str = "stub-session-token";

    #[derive(Default)]
    pub(super) struct Recorded {
        pub(super) job_queries: Mutex<Vec<String>>,
        pub(super) status_bodies: Mutex<Vec<Value>>,
    }

    fn user_json(saved: &[&str]) -> Value {
        json!({
            "_id": "u-1",
            "fullname": "Kavya Menon",
            "email": "kavya@example.com",
            "role": "student",
            "profile": { "skills": ["rust", "sql"], "savedJobs": saved }
        })
    }

    fn has_session(headers: &HeaderMap) -> bool {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|value| value.contains(&format!("token={TOKEN}")))
    }

    async fn jobs(
        State(recorded): State<Arc<Recorded>>,
        RawQuery(query): RawQuery,
    ) -> Json<Value> {
        recorded
            .job_queries
            .lock()
            .expect("queries lock")
            .push(query.unwrap_or_default());
        Json(json!({
            "success": true,
            "jobs": [{
                "_id": "job-1",
                "title": "Platform Engineer",
                "description": "Own the build pipeline",
                "requirements": ["rust", "kubernetes"],
                "company": { "_id": "c-1", "name": "Acme Cloud" },
                "location": "Bangalore",
                "position": 3,
                "jobType": "Full-time",
                "experienceLevel": 2,
                "salaryRange": { "min": 10, "max": 18 },
                "createdAt": "2026-10-10T08:00:00Z"
            }]
        }))
    }

    async fn applied(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        if !has_session(&headers) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": "User not authenticated" })),
            );
        }
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "application": [{
                    "_id": "app-1",
                    "job": { "_id": "job-1", "title": "Platform Engineer", "location": "Bangalore" },
                    "applicant": "u-1",
                    "status": "pending",
                    "skills": "rust, sql",
                    "expectedSalary": "14"
                }]
            })),
        )
    }

    async fn apply(Path(_job_id): Path<String>) -> (StatusCode, Json<Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "You have already applied for this job" })),
        )
    }

    async fn applicants(Path(job_id): Path<String>) -> Json<Value> {
        Json(json!({
            "success": true,
            "job": {
                "_id": job_id,
                "applications": [{
                    "_id": "app-9",
                    "job": job_id,
                    "applicant": {
                        "_id": "u-2",
                        "fullname": "Rohan Das",
                        "email": "rohan@example.com",
                        "role": "student"
                    },
                    "status": "accepted",
                    "resume": "https://example.com/rohan.pdf"
                }]
            }
        }))
    }

    async fn update_status(
        State(recorded): State<Arc<Recorded>>,
        Path(_application_id): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        recorded
            .status_bodies
            .lock()
            .expect("bodies lock")
            .push(body);
        Json(json!({ "success": true, "message": "Status updated successfully." }))
    }

    async fn save_job(Path(job_id): Path<String>) -> Json<Value> {
        Json(json!({
            "success": true,
            "message": "Job saved successfully",
            "user": user_json(&["job-0", &job_id])
        }))
    }

    async fn logout() -> Json<Value> {
        Json(json!({ "success": false, "message": "Session store unavailable" }))
    }

    async fn delete_account() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Json(json!({ "success": true }))
    }

    async fn broken() -> (StatusCode, &'static str) {
        (StatusCode::BAD_GATEWAY, "<html> upstream down </html>")
    }

    pub(super) async fn spawn_stub() -> (Url, Arc<Recorded>) {
        let recorded = Arc::new(Recorded::default());
        let api = Router::new()
            .route("/job/get", get(jobs))
            .route("/application/get", get(applied))
            .route("/application/apply/:job_id", post(apply))
            .route("/application/:job_id/applicants", get(applicants))
            .route("/application/status/:id/update", post(update_status))
            .route("/user/save-job/:job_id", post(save_job))
            .route("/user/logout", get(logout))
            .route("/user/profile/delete", delete(delete_account))
            .route("/user/profile/update", post(broken))
            .with_state(Arc::clone(&recorded));
        let router = Router::new().nest("/api/v1", api);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub server runs");
        });

        let base_url = Url::parse(&format!("http://{addr}/api/v1")).expect("stub base url");
        (base_url, recorded)
    }

    pub(super) fn api(base_url: &Url, token: Option<&str>) -> HttpPortalApi {
        HttpPortalApi::new(&ApiConfig {
            base_url: base_url.clone(),
            timeout: Duration::from_millis(500),
            session_token: token.map(str::to_string),
        })
        .expect("client builds")
    }
}

use job_portal::api::JobQuery;
use job_portal::domain::{
    ApplicationForm, ApplicationId, ApplicationStatus, JobId, ProfileUpdate, StatusDecision,
};
use job_portal::store::FilterCriteria;
use job_portal::{ApiError, PortalApi};

use common::{api, spawn_stub, TOKEN};

#[tokio::test]
async fn job_query_carries_keyword_and_set_refinements_only() {
    let (base_url, recorded) = spawn_stub().await;
    let api = api(&base_url, None);

    let mut filters = FilterCriteria::default();
    filters.set_location("bangalore");
    let jobs = api
        .fetch_jobs(&JobQuery::from(&filters))
        .await
        .expect("jobs load");

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company_name(), Some("Acme Cloud"));
    assert_eq!(jobs[0].positions, 3);

    filters.set_salary_range(5.0, 20.0);
    filters.set_keyword("rust dev");
    api.fetch_jobs(&JobQuery::from(&filters))
        .await
        .expect("jobs load");

    let queries = recorded.job_queries.lock().expect("queries lock").clone();
    assert_eq!(
        queries,
        vec![
            "keyword=&location=bangalore".to_string(),
            "keyword=rust+dev&location=bangalore&salaryMin=5&salaryMax=20".to_string()
        ]
    );
}

#[tokio::test]
async fn session_cookie_authenticates_credentialed_reads() {
    let (base_url, _) = spawn_stub().await;

    match api(&base_url, None).applied_jobs().await {
        Err(ApiError::Unauthorized { message }) => assert_eq!(message, "User not authenticated"),
        other => panic!("expected unauthorized, got {other:?}"),
    }

    let applied = api(&base_url, Some(TOKEN))
        .applied_jobs()
        .await
        .expect("applied jobs load");
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].skills, vec!["rust", "sql"]);
    assert_eq!(applied[0].expected_salary, Some(14.0));
    assert_eq!(applied[0].job.id(), JobId::from("job-1"));
}

#[tokio::test]
async fn duplicate_application_surfaces_server_message() {
    let (base_url, _) = spawn_stub().await;
    let form = ApplicationForm {
        resume_link: "https://example.com/resume.pdf".to_string(),
        cover_letter: "Hello".to_string(),
        ..ApplicationForm::default()
    };

    match api(&base_url, Some(TOKEN))
        .apply(&JobId::from("job-1"), &form)
        .await
    {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "You have already applied for this job");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn applicants_are_read_from_the_job_document() {
    let (base_url, _) = spawn_stub().await;
    let applicants = api(&base_url, Some(TOKEN))
        .applicants(&JobId::from("job-1"))
        .await
        .expect("applicants load");

    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0].status, ApplicationStatus::Accepted);
    let applicant = applicants[0].applicant.populated().expect("populated");
    assert_eq!(applicant.full_name, "Rohan Das");
}

#[tokio::test]
async fn status_decision_is_sent_capitalized() {
    let (base_url, recorded) = spawn_stub().await;
    let ack = api(&base_url, Some(TOKEN))
        .update_status(&ApplicationId::from("app-9"), StatusDecision::Rejected)
        .await
        .expect("status update");

    assert_eq!(ack.message.as_deref(), Some("Status updated successfully."));
    let bodies = recorded.status_bodies.lock().expect("bodies lock").clone();
    assert_eq!(bodies, vec![serde_json::json!({ "status": "Rejected" })]);
}

#[tokio::test]
async fn save_job_returns_the_server_user() {
    let (base_url, _) = spawn_stub().await;
    let change = api(&base_url, Some(TOKEN))
        .save_job(&JobId::from("job-7"))
        .await
        .expect("save succeeds");

    assert_eq!(change.message.as_deref(), Some("Job saved successfully"));
    assert_eq!(
        change.user.profile.saved_jobs,
        vec![JobId::from("job-0"), JobId::from("job-7")]
    );
}

#[tokio::test]
async fn unsuccessful_envelope_is_an_error_even_with_200() {
    let (base_url, _) = spawn_stub().await;
    match api(&base_url, Some(TOKEN)).logout().await {
        Err(ApiError::Unsuccessful { message }) => assert_eq!(message, "Session store unavailable"),
        other => panic!("expected unsuccessful envelope, got {other:?}"),
    }
}

#[tokio::test]
async fn gateway_errors_and_timeouts_are_transient() {
    let (base_url, _) = spawn_stub().await;
    let api = api(&base_url, Some(TOKEN));

    match api.update_profile(&ProfileUpdate::default()).await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "<html> upstream down </html>");
        }
        other => panic!("expected server error, got {other:?}"),
    }

    match api.delete_account().await {
        Err(ApiError::Timeout { status: None, .. }) => {}
        other => panic!("expected timeout, got {other:?}"),
    }
}
