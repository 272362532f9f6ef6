// src/probe/gate.rs
// =============================================================================
// Admission control: at most N fetches may be running at any moment.
//
// The gate hands out `Slot`s. A slot is an RAII guard: as long as you hold it
// you own one unit of capacity, and dropping it (normally, through an early
// return, or while a panic unwinds) gives the capacity back. There is no
// separate "release" call that could be forgotten.
//
// Under the hood this is a tokio Semaphore. Waiters are queued in FIFO order
// and are woken by the runtime, so nobody spins and nobody starves.
// =============================================================================

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Bounded counting gate shared by the dispatcher and every fetch task
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: NonZeroUsize,
}

/// One unit of admitted work; capacity is returned when this is dropped
#[derive(Debug)]
#[must_use = "dropping a Slot immediately releases it"]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.get())),
            capacity,
        }
    }

    /// Waits until a slot is free and takes it
    ///
    /// Only errors if the gate was closed, which this crate never does.
    pub async fn acquire(&self) -> Result<Slot, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        Ok(Slot { _permit: permit })
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Number of slots nobody holds right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Slot {
    /// Gives the slot back explicitly. Same as dropping it.
    pub fn release(self) {}
}
