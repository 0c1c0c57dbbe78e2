use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Sequence number attached to one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Orders overlapping fetches of the same resource.
///
/// Tickets are issued in increasing order; a response is written only when its
/// ticket is newer than the last one written, so a slow early request can
/// never overwrite the result of a later one.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    issued: AtomicU64,
    applied: Mutex<u64>,
}

impl SequenceGuard {
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Run `write` if `ticket` is newer than every ticket written so far.
    /// Returns whether the write happened.
    pub fn apply_if_newer(&self, ticket: Ticket, write: impl FnOnce()) -> bool {
        let mut applied = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if ticket.0 <= *applied {
            return false;
        }
        write();
        *applied = ticket.0;
        true
    }

    pub fn last_applied(&self) -> Option<Ticket> {
        let applied = match self.applied.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        (applied > 0).then_some(Ticket(applied))
    }
}
