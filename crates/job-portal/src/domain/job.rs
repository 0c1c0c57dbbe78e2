use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, Reference};

/// Posted job. Read-only from the client's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Reference<Company>>,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "position")]
    pub positions: u32,
    #[serde(default)]
    pub job_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<f64>,
    #[serde(default)]
    pub salary_range: SalaryRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Salary band in lakhs per annum. `min <= max` is expected but not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

impl Job {
    pub fn company_name(&self) -> Option<&str> {
        self.company
            .as_ref()
            .and_then(Reference::populated)
            .map(|company| company.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Whole days since the job was posted; `None` when the server omitted the timestamp.
    pub fn days_since_posted(&self, now: DateTime<Utc>) -> Option<i64> {
        self.created_at
            .map(|created| now.signed_duration_since(created).num_days().max(0))
    }

    pub fn posted_label(&self, now: DateTime<Utc>) -> String {
        match self.days_since_posted(now) {
            None | Some(0) => "Today".to_string(),
            Some(1) => "1 day ago".to_string(),
            Some(days) => format!("{days} days ago"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job(created_at: Option<DateTime<Utc>>) -> Job {
        Job {
            id: JobId::from("j-1"),
            title: "Backend Developer".to_string(),
            description: String::new(),
            requirements: Vec::new(),
            company: None,
            location: "pune".to_string(),
            positions: 2,
            job_type: "Full Time".to_string(),
            experience_level: None,
            salary_range: SalaryRange { min: 8.0, max: 12.0 },
            created_at,
        }
    }

    #[test]
    fn posted_label_counts_whole_days() {
        let posted = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let job = job(Some(posted));

        let same_day = Utc.with_ymd_and_hms(2025, 3, 1, 23, 0, 0).unwrap();
        assert_eq!(job.posted_label(same_day), "Today");
        let next_day = Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap();
        assert_eq!(job.posted_label(next_day), "1 day ago");
        let later = Utc.with_ymd_and_hms(2025, 3, 11, 8, 0, 0).unwrap();
        assert_eq!(job.posted_label(later), "9 days ago");
    }

    #[test]
    fn decodes_populated_and_bare_company() {
        let populated = r#"{
            "_id": "j-7",
            "title": "Data Analyst",
            "company": { "_id": "c-1", "name": "Acme", "logo": "https://cdn/acme.png" },
            "position": 3,
            "jobType": "Internship",
            "salaryRange": { "min": 4, "max": 6 },
            "createdAt": "2025-02-10T08:30:00.000Z"
        }"#;
        let job: Job = serde_json::from_str(populated).expect("job decodes");
        assert_eq!(job.company_name(), Some("Acme"));
        assert_eq!(job.positions, 3);
        assert_eq!(job.salary_range, SalaryRange { min: 4.0, max: 6.0 });
        assert!(job.created_at.is_some());

        let bare = r#"{ "_id": "j-8", "title": "Designer", "company": "c-2" }"#;
        let job: Job = serde_json::from_str(bare).expect("job decodes");
        assert_eq!(job.company, Some(Reference::Id("c-2".to_string())));
        assert_eq!(job.company_name(), None);
    }
}
