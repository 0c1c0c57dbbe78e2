//! Observable state containers.
//!
//! Each store owns one slice of client state behind a `tokio::sync::watch`
//! channel: writers go through the store's own operations, readers take a
//! snapshot or subscribe for change notifications.

pub mod applications;
pub mod filter;
pub mod session;

use tokio::sync::watch;

pub use applications::{ApplicantsForJob, ApplicationSummary, ApplicationsState, ApplicationsStore};
pub use filter::{FilterCriteria, FilterStore};
pub use session::{SavedJobs, SessionState, SessionStore};

/// Single-writer container shared by the typed stores.
#[derive(Debug)]
pub(crate) struct Store<S> {
    sender: watch::Sender<S>,
}

impl<S: Clone> Store<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self { sender }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.sender.borrow().clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.sender.borrow())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }

    /// Apply a reducer and always notify subscribers.
    pub(crate) fn update(&self, reducer: impl FnOnce(&mut S)) {
        self.sender.send_modify(reducer);
    }

    /// Apply a reducer that reports whether it changed anything; subscribers
    /// are only woken on change.
    pub(crate) fn update_if(&self, reducer: impl FnOnce(&mut S) -> bool) -> bool {
        self.sender.send_if_modified(reducer)
    }
}

/// The three stores a view reads from, bundled for explicit passing.
#[derive(Debug, Default)]
pub struct Stores {
    pub filters: FilterStore,
    pub session: SessionStore,
    pub applications: ApplicationsStore,
}
