use std::collections::HashSet;

use tokio::sync::watch;

use super::Store;
use crate::domain::{JobId, User, UserRole};

/// Bookmarked job ids in insertion order, never duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedJobs {
    order: Vec<JobId>,
    members: HashSet<JobId>,
}

impl SavedJobs {
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = JobId>,
    {
        let mut saved = Self::default();
        for id in ids {
            saved.insert(id);
        }
        saved
    }

    fn insert(&mut self, id: JobId) -> bool {
        if self.members.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, id: &JobId) -> bool {
        if self.members.remove(id) {
            self.order.retain(|existing| existing != id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.members.contains(id)
    }

    /// Remove when present, append otherwise. Returns whether `id` is now saved.
    pub fn toggle(&mut self, id: JobId) -> bool {
        if self.remove(&id) {
            false
        } else {
            self.insert(id)
        }
    }

    pub fn as_slice(&self) -> &[JobId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub saved_jobs: SavedJobs,
    pub loading: bool,
    /// Bumped whenever the signed-in identity changes.
    generation: u64,
}

impl SessionState {
    /// The only write path for `user`; `saved_jobs` is re-derived here.
    pub fn set_user(&mut self, user: Option<User>) {
        let current = self.user.as_ref().map(|user| &user.id);
        if current != user.as_ref().map(|user| &user.id) {
            self.generation += 1;
        }
        self.saved_jobs = user
            .as_ref()
            .map(|user| SavedJobs::from_ids(user.profile.saved_jobs.iter().cloned()))
            .unwrap_or_default();
        self.user = user;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_saved_jobs(&mut self, ids: Vec<JobId>) {
        self.saved_jobs = SavedJobs::from_ids(ids);
    }

    pub fn toggle_saved_job(&mut self, id: JobId) -> bool {
        self.saved_jobs.toggle(id)
    }

    pub fn set_loading(&mut self, loading: bool) -> bool {
        if self.loading == loading {
            return false;
        }
        self.loading = loading;
        true
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|user| user.role)
    }
}

/// Owns the signed-in user and the saved-job set derived from it.
#[derive(Debug)]
pub struct SessionStore {
    inner: Store<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            inner: Store::new(SessionState::default()),
        }
    }
}

impl SessionStore {
    pub fn snapshot(&self) -> SessionState {
        self.inner.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.subscribe()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.inner.update(|state| state.set_user(user));
    }

    /// Identity generation for tagging a request before it is sent.
    pub fn generation(&self) -> u64 {
        self.inner.read(SessionState::generation)
    }

    /// The signed-in user together with the current generation.
    pub fn signed_in(&self) -> Option<(User, u64)> {
        self.inner
            .read(|state| state.user.clone().map(|user| (user, state.generation)))
    }

    /// Adopt a server-confirmed user, unless the session that sent the request
    /// has since ended or changed hands.
    pub fn set_user_within(&self, generation: u64, user: User) -> bool {
        self.inner.update_if(|state| {
            if state.generation != generation {
                return false;
            }
            state.set_user(Some(user));
            true
        })
    }

    /// Run `write` only while `generation` is still current. The session stays
    /// locked during `write`, so it cannot interleave with a sign-in or
    /// sign-out.
    pub fn within<R>(&self, generation: u64, write: impl FnOnce() -> R) -> Option<R> {
        let mut result = None;
        self.inner.update_if(|state| {
            if state.generation == generation {
                result = Some(write());
            }
            false
        });
        result
    }

    pub fn set_saved_jobs(&self, ids: Vec<JobId>) {
        self.inner.update(|state| state.set_saved_jobs(ids));
    }

    pub fn toggle_saved_job(&self, id: JobId) -> bool {
        let mut saved = false;
        self.inner.update(|state| saved = state.toggle_saved_job(id));
        saved
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.update_if(|state| state.set_loading(loading));
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.read(|state| state.user.clone())
    }

    pub fn is_saved(&self, id: &JobId) -> bool {
        self.inner.read(|state| state.saved_jobs.contains(id))
    }

    pub fn role(&self) -> Option<UserRole> {
        self.inner.read(SessionState::role)
    }

    pub fn is_recruiter(&self) -> bool {
        self.role() == Some(UserRole::Recruiter)
    }
}
