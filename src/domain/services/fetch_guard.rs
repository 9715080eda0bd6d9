use parking_lot::Mutex;
use tracing::debug;

/// Identifies one fetch of a tenant-scoped resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub tenant_id: String,
    pub generation: u64,
}

struct Slot<T> {
    generation: u64,
    value: T,
}

/// A tenant-scoped value whose fetches are tagged so that only the newest
/// one can land. Any result carrying another tenant id, or one overtaken by
/// a later `begin`, is dropped.
pub struct Scoped<T> {
    tenant_id: String,
    slot: Mutex<Slot<T>>,
}

impl<T> Scoped<T> {
    pub fn new(tenant_id: impl Into<String>, initial: T) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            slot: Mutex::new(Slot { generation: 0, value: initial }),
        }
    }

    pub fn begin(&self) -> FetchTicket {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        FetchTicket {
            tenant_id: self.tenant_id.clone(),
            generation: slot.generation,
        }
    }

    pub fn commit(&self, ticket: &FetchTicket, value: T) -> bool {
        self.apply(ticket, |slot| *slot = value)
    }

    /// Runs `f` on the value only if `ticket` is still current.
    pub fn apply(&self, ticket: &FetchTicket, f: impl FnOnce(&mut T)) -> bool {
        let mut slot = self.slot.lock();
        if ticket.tenant_id != self.tenant_id || ticket.generation != slot.generation {
            debug!(
                tenant_id = %ticket.tenant_id,
                generation = ticket.generation,
                current = slot.generation,
                "Discarding stale fetch result"
            );
            return false;
        }
        f(&mut slot.value);
        true
    }

    /// Local write. Supersedes every fetch started before it.
    pub fn set(&self, value: T) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.value = value;
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.lock().value)
    }

    /// In-place edit that leaves in-flight fetches valid.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.slot.lock().value)
    }
}

impl<T: Clone> Scoped<T> {
    pub fn snapshot(&self) -> T {
        self.slot.lock().value.clone()
    }
}
