//! Client-side state layer for the job portal.
//!
//! Three typed stores hold the filters, the session and the application data;
//! the [`sync`] layer fills them from a [`api::PortalApi`] only after the
//! server confirms a request.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod notify;
pub mod store;
pub mod sync;
pub mod telemetry;

pub use api::{ApiError, HttpPortalApi, PortalApi};
pub use notify::{
    Notification, NotificationLevel, Notifier, RecordingNotifier, Route, TracingNotifier,
};
pub use store::{ApplicationsStore, FilterStore, SessionStore, Stores};
pub use sync::{FailureKind, JobListSync, PortalClient, PortalError, SyncOutcome};
