//! Timeline semaphore interface.
//!
//! A semaphore is a monotonically increasing 64-bit counter shared between
//! the host and device queues. Work signals it to a new value when it
//! completes; consumers wait until it reaches a value. A semaphore can also
//! be failed, after which every current and future waiter observes the
//! failure status instead of the payload.
//!
//! The runtime only consumes semaphores through the [`Semaphore`] trait and
//! holds them through [`SemaphoreRef`] handles. Device backends supply their
//! own implementations; [`TimelineSemaphore`](crate::TimelineSemaphore) is a
//! host-only one.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use vela_core::Status;

use crate::error::HalResult;

/// How long a wait may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Poll once without blocking.
    Immediate,
    /// Block for at most the given duration.
    After(Duration),
    /// Block until the given point in time.
    At(Instant),
    /// Block until the condition is met.
    #[default]
    Infinite,
}

impl Timeout {
    /// Convert to an absolute deadline. `None` means no deadline.
    ///
    /// `Immediate` maps to "now" so a single shared deadline can be used
    /// across several waits.
    pub fn deadline(self) -> Option<Instant> {
        match self {
            Self::Immediate => Some(Instant::now()),
            Self::After(duration) => Instant::now().checked_add(duration),
            Self::At(instant) => Some(instant),
            Self::Infinite => None,
        }
    }

    /// Build a timeout from an optional absolute deadline.
    pub fn from_deadline(deadline: Option<Instant>) -> Self {
        deadline.map_or(Self::Infinite, Self::At)
    }
}

/// A timeline semaphore.
///
/// Implementations must be safe to signal, fail and wait on from multiple
/// threads concurrently; several fences may reference the same semaphore.
pub trait Semaphore: Send + Sync + fmt::Debug {
    /// Current payload value.
    ///
    /// Returns the failure status if the semaphore has been failed.
    fn query(&self) -> HalResult<u64>;

    /// Advance the payload to `value` and wake waiters that are satisfied.
    fn signal(&self, value: u64) -> HalResult<()>;

    /// Poison the semaphore with `status`.
    fn fail(&self, status: Status);

    /// Block until the payload reaches at least `value`.
    fn wait(&self, value: u64, timeout: Timeout) -> HalResult<()>;
}

/// Reference-counted handle to a semaphore.
///
/// Cloning retains the semaphore and dropping releases it. Equality and
/// hashing use the identity of the underlying semaphore object, so two
/// handles compare equal only if they point at the same semaphore.
#[derive(Clone)]
pub struct SemaphoreRef(Arc<dyn Semaphore>);

impl SemaphoreRef {
    /// Take shared ownership of a semaphore.
    pub fn new(semaphore: impl Semaphore + 'static) -> Self {
        Self(Arc::new(semaphore))
    }

    /// Wrap an already shared semaphore.
    pub fn from_arc(semaphore: Arc<dyn Semaphore>) -> Self {
        Self(semaphore)
    }

    /// Whether both handles refer to the same semaphore.
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// Number of live handles to the semaphore.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl Deref for SemaphoreRef {
    type Target = dyn Semaphore;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for SemaphoreRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for SemaphoreRef {}

impl Hash for SemaphoreRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for SemaphoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<S: Semaphore + 'static> From<Arc<S>> for SemaphoreRef {
    fn from(semaphore: Arc<S>) -> Self {
        Self(semaphore)
    }
}

static_assertions::assert_impl_all!(SemaphoreRef: Send, Sync);
