//! Shared fixtures for fence integration tests.
//!
//! - [`TrackingAllocator`] counts allocations and can be told to fail.
//! - [`RecordingSemaphore`] logs every signal and fail call into a journal
//!   shared by all semaphores of a test, preserving cross-semaphore order.

#![allow(dead_code)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use vela_core::{AllocError, Allocator, HostAllocator, Status, SystemAllocator};
use vela_hal::{HalError, HalResult, Semaphore, SemaphoreRef, Timeout};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Allocation tracking
// ============================================================================

#[derive(Debug, Default)]
pub struct AllocationStats {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    fail: AtomicBool,
}

impl AllocationStats {
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    /// Make every following allocation fail.
    pub fn fail_allocations(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

pub struct TrackingAllocator {
    stats: Arc<AllocationStats>,
}

impl Allocator for TrackingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if self.stats.fail.load(Ordering::SeqCst) {
            return Err(AllocError::for_layout(layout));
        }
        let ptr = SystemAllocator.allocate(layout)?;
        self.stats.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.stats.deallocations.fetch_add(1, Ordering::SeqCst);
        unsafe { SystemAllocator.deallocate(ptr, layout) }
    }

    fn name(&self) -> &str {
        "tracking"
    }
}

/// Create a tracking allocator and a handle to its statistics.
pub fn tracking_allocator() -> (HostAllocator, Arc<AllocationStats>) {
    let stats = Arc::new(AllocationStats::default());
    let allocator = HostAllocator::new(TrackingAllocator {
        stats: stats.clone(),
    });
    (allocator, stats)
}

// ============================================================================
// Recording semaphore
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Signal {
        semaphore: usize,
        value: u64,
    },
    Fail {
        semaphore: usize,
        status: Status,
        /// Address of the status message buffer, to tell moves from clones.
        message_ptr: usize,
    },
}

pub type Journal = Arc<Mutex<Vec<Event>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Semaphore that records calls and optionally rejects signals.
#[derive(Debug)]
pub struct RecordingSemaphore {
    id: usize,
    journal: Journal,
    reject_signal: bool,
}

impl RecordingSemaphore {
    pub fn new(id: usize, journal: &Journal) -> SemaphoreRef {
        SemaphoreRef::new(Self {
            id,
            journal: journal.clone(),
            reject_signal: false,
        })
    }

    pub fn rejecting(id: usize, journal: &Journal) -> SemaphoreRef {
        SemaphoreRef::new(Self {
            id,
            journal: journal.clone(),
            reject_signal: true,
        })
    }
}

impl Semaphore for RecordingSemaphore {
    fn query(&self) -> HalResult<u64> {
        Ok(0)
    }

    fn signal(&self, value: u64) -> HalResult<()> {
        self.journal.lock().push(Event::Signal {
            semaphore: self.id,
            value,
        });
        if self.reject_signal {
            return Err(HalError::PropagatedFailure(Status::internal(format!(
                "semaphore {} rejected signal",
                self.id
            ))));
        }
        Ok(())
    }

    fn fail(&self, status: Status) {
        let message_ptr = status.message().as_ptr() as usize;
        self.journal.lock().push(Event::Fail {
            semaphore: self.id,
            status,
            message_ptr,
        });
    }

    fn wait(&self, _value: u64, _timeout: Timeout) -> HalResult<()> {
        Ok(())
    }
}
