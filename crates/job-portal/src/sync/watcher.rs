use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tracing::debug;

use super::client::PortalClient;
use crate::api::PortalApi;
use crate::notify::Notifier;
use crate::store::Stores;

/// Background task that refetches the job list whenever the filters change.
///
/// Fetches for successive filter values may overlap; each gets a ticket before
/// it starts, so only the newest response reaches the store. Dropping the
/// handle ends the browse session: the task and every fetch still in flight
/// are aborted, then the filters go back to their defaults.
#[derive(Debug)]
pub struct JobListSync {
    task: JoinHandle<()>,
    stores: Arc<Stores>,
}

impl JobListSync {
    pub(crate) fn spawn<A, N>(client: Arc<PortalClient<A, N>>) -> Self
    where
        A: PortalApi + 'static,
        N: Notifier + 'static,
    {
        let stores = client.shared_stores();
        let mut filters = stores.filters.subscribe();
        let task = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            loop {
                let criteria = filters.borrow_and_update().clone();
                let ticket = client.issue_job_ticket();
                let worker = Arc::clone(&client);
                in_flight.spawn(async move {
                    if let Err(error) = worker.fetch_jobs(ticket, criteria).await {
                        debug!(ticket = ticket.value(), %error, "background job refresh failed");
                    }
                });

                while in_flight.try_join_next().is_some() {}

                if filters.changed().await.is_err() {
                    break;
                }
            }
            while in_flight.join_next().await.is_some() {}
        });

        Self { task, stores }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for JobListSync {
    fn drop(&mut self) {
        self.task.abort();
        self.stores.filters.reset();
    }
}
