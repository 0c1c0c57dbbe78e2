//! Wire-compatible documents exchanged with the portal API.

pub mod application;
pub mod job;
pub mod user;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use application::{
    Application, ApplicationForm, ApplicationFormError, ApplicationStatus, StatusDecision,
    StatusTone, StatusTransitionError,
};
pub use job::{Company, Job, SalaryRange};
pub use user::{Profile, ProfilePhoto, ProfileUpdate, ProfileUpdateError, User, UserRole};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Server-assigned job identifier (`_id`).
    JobId
);
string_id!(
    /// Server-assigned user identifier.
    UserId
);
string_id!(
    /// Server-assigned application identifier.
    ApplicationId
);

/// A relation the server may or may not populate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Populated(Box<T>),
}

impl<T> Reference<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Populated(document) => Some(document.as_ref()),
        }
    }
}

impl Reference<Job> {
    pub fn id(&self) -> JobId {
        match self {
            Reference::Id(id) => JobId(id.clone()),
            Reference::Populated(job) => job.id.clone(),
        }
    }
}

impl Reference<User> {
    pub fn id(&self) -> UserId {
        match self {
            Reference::Id(id) => UserId(id.clone()),
            Reference::Populated(user) => user.id.clone(),
        }
    }
}
