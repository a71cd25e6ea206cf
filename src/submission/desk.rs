use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::debug;
use uuid::Uuid;

use super::workbench::{Workbench, WorkbenchSnapshot};
use crate::services::qr::QrImage;

/// How long a client's workbench survives without being touched.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Slot {
    bench: Workbench,
    touched: Instant,
}

/// Per-client workbenches. The lock is only held for bookkeeping, never
/// across the summarization call or rendering.
///
/// Workbenches idle for longer than the TTL are dropped the next time any
/// client goes through `with_bench`, and are invisible to reads before that.
pub struct SubmissionDesk {
    slots: Mutex<HashMap<Uuid, Slot>>,
    idle_ttl: Duration,
}

impl Default for SubmissionDesk {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SubmissionDesk {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub fn with_bench<T>(&self, client: Uuid, f: impl FnOnce(&mut Workbench) -> T) -> T {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        let before = slots.len();
        slots.retain(|id, slot| *id == client || slot.touched.elapsed() < self.idle_ttl);
        if slots.len() < before {
            debug!("Dropped {} idle workbench(es)", before - slots.len());
        }

        let slot = slots.entry(client).or_insert_with(|| Slot {
            bench: Workbench::default(),
            touched: Instant::now(),
        });
        slot.touched = Instant::now();
        f(&mut slot.bench)
    }

    fn read<T>(&self, client: Uuid, f: impl FnOnce(&Workbench) -> Option<T>) -> Option<T> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&client)
            .filter(|slot| slot.touched.elapsed() < self.idle_ttl)
            .and_then(|slot| f(&slot.bench))
    }

    pub fn snapshot(&self, client: Uuid) -> Option<WorkbenchSnapshot> {
        self.read(client, |b| Some(b.snapshot()))
    }

    pub fn image(&self, client: Uuid) -> Option<QrImage> {
        self.read(client, |b| b.image().cloned())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}
