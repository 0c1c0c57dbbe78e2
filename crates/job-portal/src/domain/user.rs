use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{JobId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Recruiter,
}

/// Signed-in account as returned by the server. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub saved_jobs: Vec<JobId>,
}

/// Fields sent by the profile dialog. Skills travel as one comma-separated string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub resume_link: String,
    pub profile_photo: Option<ProfilePhoto>,
}

impl ProfileUpdate {
    /// Seed the form from the current user, as the dialog does on open.
    pub fn from_user(user: &User) -> Self {
        Self {
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            bio: user.profile.bio.clone().unwrap_or_default(),
            skills: user.profile.skills.clone(),
            resume_link: user.profile.resume.clone().unwrap_or_default(),
            profile_photo: None,
        }
    }

    pub fn skills_field(&self) -> String {
        self.skills.join(",")
    }

    pub fn validate(&self) -> Result<(), ProfileUpdateError> {
        match &self.profile_photo {
            Some(photo) if photo.content_type().type_() != mime::IMAGE => {
                Err(ProfileUpdateError::PhotoNotImage {
                    file_name: photo.file_name.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Split a free-form skills input on commas, dropping blanks.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePhoto {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ProfilePhoto {
    pub fn content_type(&self) -> mime::Mime {
        mime_guess::from_path(Path::new(&self.file_name)).first_or_octet_stream()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileUpdateError {
    #[error("profile photo '{file_name}' is not an image")]
    PhotoNotImage { file_name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_user_with_missing_profile_fields() {
        let raw = r#"{
            "_id": "u-1",
            "fullname": "Asha Rao",
            "email": "asha@example.com",
            "role": "student",
            "profile": { "skills": ["rust", "sql"], "savedJobs": ["j-1", "j-2"] }
        }"#;
        let user: User = serde_json::from_str(raw).expect("user decodes");
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.profile.skills, vec!["rust", "sql"]);
        assert_eq!(user.profile.saved_jobs, vec![JobId::from("j-1"), JobId::from("j-2")]);
        assert_eq!(user.profile.bio, None);
    }

    #[test]
    fn parse_skills_trims_and_drops_blanks() {
        assert_eq!(parse_skills(" rust, ,tokio ,"), vec!["rust", "tokio"]);
        assert!(parse_skills("").is_empty());
    }

    #[test]
    fn photo_must_be_an_image() {
        let mut update = ProfileUpdate {
            profile_photo: Some(ProfilePhoto {
                file_name: "me.png".to_string(),
                bytes: vec![1, 2, 3],
            }),
            ..ProfileUpdate::default()
        };
        assert!(update.validate().is_ok());

        update.profile_photo = Some(ProfilePhoto {
            file_name: "resume.pdf".to_string(),
            bytes: Vec::new(),
        });
        assert_eq!(
            update.validate(),
            Err(ProfileUpdateError::PhotoNotImage {
                file_name: "resume.pdf".to_string()
            })
        );
    }
}
