//! Data-sync layer: moves authoritative server data into the stores.

mod client;
pub mod sequence;
mod watcher;

pub use client::PortalClient;
pub use sequence::{SequenceGuard, Ticket};
pub use watcher::JobListSync;

use crate::api::ApiError;
use crate::domain::{ApplicationFormError, ProfileUpdateError, StatusTransitionError};

/// Result of a sync that completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The store now holds the fetched items.
    Applied { count: usize },
    /// Preconditions were not met (for example no signed-in user); nothing was fetched.
    Skipped,
    /// A newer request already wrote the store; this response was dropped.
    Superseded,
}

/// How a failure should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Send the user to the login view; do not retry.
    AuthenticationRequired,
    /// Show the message verbatim; retrying unchanged will fail again.
    Rejected,
    /// Generic failure; the user may retry manually.
    Transient,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    #[error("no signed-in user")]
    SignInRequired,
    #[error(transparent)]
    Form(#[from] ApplicationFormError),
    #[error(transparent)]
    Profile(#[from] ProfileUpdateError),
    #[error(transparent)]
    Status(#[from] StatusTransitionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PortalError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PortalError::SignInRequired | PortalError::Api(ApiError::Unauthorized { .. }) => {
                FailureKind::AuthenticationRequired
            }
            PortalError::Form(_)
            | PortalError::Profile(_)
            | PortalError::Status(_)
            | PortalError::Api(
                ApiError::Rejected { .. }
                | ApiError::Unsuccessful { .. }
                | ApiError::InvalidRequest(_),
            ) => FailureKind::Rejected,
            PortalError::Api(
                ApiError::Server { .. }
                | ApiError::Timeout { .. }
                | ApiError::Transport(_)
                | ApiError::Decode(_),
            ) => FailureKind::Transient,
        }
    }

    /// Text to show the user as-is, when the failure carries one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            PortalError::SignInRequired => None,
            PortalError::Form(err) => Some(err.to_string()),
            PortalError::Profile(err) => Some(err.to_string()),
            PortalError::Status(err) => Some(err.to_string()),
            PortalError::Api(err) => err.server_message().map(str::to_string),
        }
    }
}
