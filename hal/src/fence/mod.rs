//! Fences: joined sets of semaphore timepoints.
//!
//! A [`Fence`] holds unique `(semaphore, value)` timepoints and represents
//! the point at which every one of them has been reached. Queues take fences
//! to describe what a submission waits on and what it signals when done.
//!
//! # Lifecycle
//!
//! A fence is created with a fixed capacity, filled by a single owner via
//! [`Fence::insert`], and then shared by cloning the handle. Clones are cheap
//! (an atomic increment) and may be sent to other threads. Once a fence is
//! shared it is frozen: `insert` fails until only one handle remains.
//!
//! The absent fence is expressed as `None`. It behaves like a fence with no
//! timepoints: waiting completes immediately, signaling and failing do
//! nothing. The free functions in this module ([`signal`], [`fail`],
//! [`wait`], [`query`], [`semaphore_list`]) accept `Option<&Fence>` for that
//! reason.
//!
//! # Example
//!
//! ```
//! use vela_core::HostAllocator;
//! use vela_hal::{Fence, SemaphoreRef, TimelineSemaphore, Timeout};
//!
//! let allocator = HostAllocator::system();
//! let compute = SemaphoreRef::new(TimelineSemaphore::new(0));
//! let transfer = SemaphoreRef::new(TimelineSemaphore::new(0));
//!
//! let mut a = Fence::create(2, &allocator).unwrap();
//! a.insert(&compute, 5).unwrap();
//! let mut b = Fence::create(2, &allocator).unwrap();
//! b.insert(&compute, 7).unwrap();
//! b.insert(&transfer, 2).unwrap();
//!
//! let joined = Fence::join([Some(&a), Some(&b)], &allocator).unwrap().unwrap();
//! assert_eq!(joined.semaphore_list().value_of(&compute), Some(7));
//!
//! joined.signal().unwrap();
//! joined.wait(Timeout::Immediate).unwrap();
//! ```

mod list;
mod storage;

use std::collections::HashSet;
use std::fmt;

use vela_core::profiling::{profile_function, profile_message, profile_scope};
use vela_core::{HostAllocator, Status};

use crate::error::{HalError, HalResult};
use crate::semaphore::{SemaphoreRef, Timeout};

pub use list::{Iter, SemaphoreList};
pub use storage::MAX_FENCE_CAPACITY;

use storage::RawFence;

/// How [`Fence::join_with`] sizes the joined fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStrategy {
    /// Allocate the sum of all input counts without looking for overlap.
    ///
    /// Cheapest to compute; wastes slots when inputs share semaphores.
    #[default]
    WorstCase,
    /// Count unique semaphores first and allocate exactly that many slots.
    Exact,
}

/// Reference-counted set of unique semaphore timepoints.
///
/// Cloning retains the fence, dropping releases it. The storage, and the
/// references it holds on every inserted semaphore, are released when the
/// last handle is dropped.
pub struct Fence {
    raw: RawFence,
}

// SAFETY: the storage holds `SemaphoreRef`s (Send + Sync), plain `u64`s and
// a `HostAllocator` (Send + Sync). The reference count is atomic, and the
// timepoint arrays are only written through `&mut Fence` while the count is
// exactly one, so no handle on another thread can observe the writes.
unsafe impl Send for Fence {}
unsafe impl Sync for Fence {}

impl Fence {
    /// Create an empty fence able to hold `capacity` unique semaphores.
    ///
    /// Fails with [`HalError::ResourceExhausted`] if `capacity` is not below
    /// [`MAX_FENCE_CAPACITY`], or with [`HalError::AllocationFailure`] if the
    /// allocator cannot provide the storage.
    pub fn create(capacity: usize, allocator: &HostAllocator) -> HalResult<Self> {
        profile_function!();
        let raw = RawFence::allocate(capacity, allocator)?;
        log::trace!(
            "Created fence with capacity {} ({} bytes from '{}' allocator)",
            capacity,
            raw.allocation_size(),
            allocator.name()
        );
        Ok(Self { raw })
    }

    /// Create a fence holding a single timepoint.
    pub fn create_at(
        semaphore: &SemaphoreRef,
        value: u64,
        allocator: &HostAllocator,
    ) -> HalResult<Self> {
        let mut fence = Self::create(1, allocator)?;
        fence.insert(semaphore, value)?;
        Ok(fence)
    }

    /// Build a fence from a list of timepoints, merging duplicates.
    ///
    /// The fence is sized to the number of unique semaphores. An empty list
    /// yields the absent fence without allocating.
    pub fn from_timepoints<'a>(
        timepoints: impl IntoIterator<Item = (&'a SemaphoreRef, u64)>,
        allocator: &HostAllocator,
    ) -> HalResult<Option<Self>> {
        let timepoints: Vec<_> = timepoints.into_iter().collect();
        let mut seen = HashSet::with_capacity(timepoints.len());
        let unique = timepoints
            .iter()
            .filter(|(semaphore, _)| seen.insert(*semaphore))
            .count();
        if unique == 0 {
            return Ok(None);
        }

        let mut fence = Self::create(unique, allocator)?;
        for (semaphore, value) in timepoints {
            fence.insert(semaphore, value)?;
        }
        Ok(Some(fence))
    }

    /// Join `fences` into a new fence that is reached when all of them are.
    ///
    /// Equivalent to [`join_with`](Self::join_with) using
    /// [`JoinStrategy::WorstCase`].
    pub fn join<'a>(
        fences: impl IntoIterator<Item = Option<&'a Fence>>,
        allocator: &HostAllocator,
    ) -> HalResult<Option<Self>> {
        Self::join_with(fences, allocator, JoinStrategy::default())
    }

    /// Join `fences` into a new fence that is reached when all of them are.
    ///
    /// Timepoints are inserted in input order, so the result lists
    /// semaphores in the order they were first seen. Semaphores present in
    /// several inputs keep their maximum value. Absent inputs, and repeated
    /// occurrences of the same fence, contribute nothing.
    ///
    /// Returns `Ok(None)` (the absent fence) without allocating when no
    /// input carries a timepoint. On error no fence is returned; a partially
    /// built one is released.
    pub fn join_with<'a>(
        fences: impl IntoIterator<Item = Option<&'a Fence>>,
        allocator: &HostAllocator,
        strategy: JoinStrategy,
    ) -> HalResult<Option<Self>> {
        profile_function!();

        let mut visited = HashSet::new();
        let sources: Vec<&Fence> = fences
            .into_iter()
            .flatten()
            .filter(|fence| visited.insert(fence.as_ptr()))
            .collect();

        let capacity: usize = match strategy {
            JoinStrategy::WorstCase => sources.iter().map(|fence| fence.len()).sum(),
            JoinStrategy::Exact => {
                let mut seen = HashSet::new();
                sources
                    .iter()
                    .flat_map(|fence| fence.semaphore_list().semaphores())
                    .filter(|semaphore| seen.insert(*semaphore))
                    .count()
            }
        };
        if capacity == 0 {
            log::trace!("Joined {} fences into the absent fence", sources.len());
            return Ok(None);
        }

        let mut joined = Self::create(capacity, allocator)?;
        {
            profile_scope!("insert_timepoints");
            for source in &sources {
                for (semaphore, value) in source.semaphore_list() {
                    joined.insert(semaphore, value)?;
                }
            }
        }

        log::debug!(
            "Joined {} fences: {} unique timepoints in capacity {} ({:?})",
            sources.len(),
            joined.len(),
            joined.capacity(),
            strategy
        );
        Ok(Some(joined))
    }

    /// Insert a timepoint.
    ///
    /// If `semaphore` is already present its value becomes the maximum of
    /// the stored and the new value. Otherwise the semaphore is retained
    /// and appended.
    ///
    /// Fails without modifying the fence if the capacity of unique
    /// semaphores is reached ([`HalError::ResourceExhausted`]) or if the
    /// fence has already been shared ([`HalError::FailedPrecondition`]).
    pub fn insert(&mut self, semaphore: &SemaphoreRef, value: u64) -> HalResult<()> {
        let holders = self.ref_count();
        if holders != 1 {
            return Err(HalError::FailedPrecondition(format!(
                "cannot insert into a fence shared by {holders} holders"
            )));
        }

        if let Some(index) = self
            .semaphore_list()
            .semaphores()
            .iter()
            .position(|existing| existing.same(semaphore))
        {
            // SAFETY: sole holder (checked above) and `index < count`.
            unsafe { self.raw.merge_value(index, value) };
            return Ok(());
        }

        if self.len() >= self.capacity() {
            return Err(HalError::ResourceExhausted(format!(
                "fence unique semaphore capacity {} reached",
                self.capacity()
            )));
        }
        // SAFETY: sole holder (checked above) and `count < capacity`.
        unsafe { self.raw.push(semaphore.clone(), value) };
        Ok(())
    }

    /// Maximum number of unique semaphores the fence can hold.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Number of timepoints currently stored.
    pub fn len(&self) -> usize {
        self.raw.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live handles to this fence.
    pub fn ref_count(&self) -> usize {
        self.raw.ref_count()
    }

    /// Whether this is the only handle, i.e. the fence may still be mutated.
    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1
    }

    /// Whether two handles refer to the same fence.
    pub fn ptr_eq(a: &Fence, b: &Fence) -> bool {
        a.as_ptr() == b.as_ptr()
    }

    /// Address of the shared storage, usable as an identity key.
    pub fn as_ptr(&self) -> *const () {
        self.raw.as_ptr()
    }

    /// The allocator the fence storage came from.
    pub fn allocator(&self) -> &HostAllocator {
        self.raw.allocator()
    }

    /// Borrowed view of the stored timepoints.
    pub fn semaphore_list(&self) -> SemaphoreList<'_> {
        let (semaphores, values) = self.raw.timepoints();
        SemaphoreList::new(semaphores, values)
    }

    /// Signal every semaphore to its recorded value, in storage order.
    ///
    /// Stops at the first failing semaphore and returns its error.
    /// Semaphores before it stay signaled and those after it are left
    /// untouched; callers usually respond by failing the fence.
    pub fn signal(&self) -> HalResult<()> {
        profile_function!();
        for (index, (semaphore, value)) in self.semaphore_list().iter().enumerate() {
            if let Err(err) = semaphore.signal(value) {
                log::warn!(
                    "Fence signal stopped at timepoint {} of {}: {}",
                    index + 1,
                    self.len(),
                    err
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Fail every semaphore with `status`.
    ///
    /// Each semaphore but the last receives a clone; the last receives
    /// `status` itself. An empty fence drops the status.
    pub fn fail(&self, status: Status) {
        profile_function!();
        profile_message!(status.code().as_str());

        let list = self.semaphore_list();
        let Some((last, rest)) = list.semaphores().split_last() else {
            log::debug!("Discarding failure status for empty fence: {}", status);
            return;
        };
        for semaphore in rest {
            semaphore.fail(status.clone());
        }
        last.fail(status);
    }

    /// Whether every timepoint has been reached.
    ///
    /// Returns the failure of any failed semaphore.
    pub fn query(&self) -> HalResult<bool> {
        let mut reached = true;
        for (semaphore, value) in self.semaphore_list() {
            if semaphore.query()? < value {
                reached = false;
            }
        }
        Ok(reached)
    }

    /// Block until every timepoint is reached.
    ///
    /// All timepoints share one deadline derived from `timeout`.
    pub fn wait(&self, timeout: Timeout) -> HalResult<()> {
        profile_function!();
        let timeout = Timeout::from_deadline(timeout.deadline());
        for (semaphore, value) in self.semaphore_list() {
            semaphore.wait(value, timeout)?;
        }
        Ok(())
    }
}

impl Clone for Fence {
    fn clone(&self) -> Self {
        self.raw.retain();
        Self { raw: self.raw }
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        if !self.raw.release() {
            return;
        }
        profile_scope!("fence_destroy");
        log::trace!("Destroying fence with {} timepoints", self.len());
        // SAFETY: this was the last handle; `raw` is not used again.
        unsafe { self.raw.destroy() };
    }
}

impl fmt::Debug for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fence")
            .field("capacity", &self.capacity())
            .field("ref_count", &self.ref_count())
            .field(
                "timepoints",
                &self.semaphore_list().iter().collect::<Vec<_>>(),
            )
            .finish()
    }
}

static_assertions::assert_impl_all!(Fence: Send, Sync);

/// Signal `fence`; the absent fence is a no-op.
pub fn signal(fence: Option<&Fence>) -> HalResult<()> {
    fence.map_or(Ok(()), Fence::signal)
}

/// Fail `fence` with `status`; the absent fence drops the status.
pub fn fail(fence: Option<&Fence>, status: Status) {
    match fence {
        Some(fence) => fence.fail(status),
        None => log::debug!("Discarding failure status for absent fence: {}", status),
    }
}

/// Wait on `fence`; the absent fence completes immediately.
pub fn wait(fence: Option<&Fence>, timeout: Timeout) -> HalResult<()> {
    fence.map_or(Ok(()), |fence| fence.wait(timeout))
}

/// Query `fence`; the absent fence is always reached.
pub fn query(fence: Option<&Fence>) -> HalResult<bool> {
    fence.map_or(Ok(true), Fence::query)
}

/// Timepoints of `fence`; empty for the absent fence.
pub fn semaphore_list(fence: Option<&Fence>) -> SemaphoreList<'_> {
    fence.map_or_else(SemaphoreList::empty, Fence::semaphore_list)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vela_core::StatusCode;

    use super::*;
    use crate::{Semaphore, TimelineSemaphore};

    fn semaphore(initial: u64) -> SemaphoreRef {
        SemaphoreRef::new(TimelineSemaphore::new(initial))
    }

    fn values(fence: &Fence) -> Vec<u64> {
        fence.semaphore_list().values().to_vec()
    }

    #[test]
    fn test_create_empty() {
        let fence = Fence::create(4, &HostAllocator::system()).unwrap();
        assert_eq!(fence.capacity(), 4);
        assert_eq!(fence.len(), 0);
        assert!(fence.is_empty());
        assert_eq!(fence.ref_count(), 1);
    }

    #[test]
    fn test_create_capacity_limit() {
        let allocator = HostAllocator::system();
        assert!(Fence::create(MAX_FENCE_CAPACITY - 1, &allocator).is_ok());

        let err = Fence::create(MAX_FENCE_CAPACITY, &allocator).unwrap_err();
        assert_eq!(err.code(), StatusCode::ResourceExhausted);
    }

    #[test]
    fn test_insert_merges_max() {
        let s = semaphore(0);
        let mut fence = Fence::create(2, &HostAllocator::system()).unwrap();

        fence.insert(&s, 7).unwrap();
        fence.insert(&s, 3).unwrap();
        assert_eq!(fence.len(), 1);
        assert_eq!(values(&fence), vec![7]);

        fence.insert(&s, 9).unwrap();
        assert_eq!(fence.len(), 1);
        assert_eq!(values(&fence), vec![9]);
    }

    #[test]
    fn test_insert_retains_semaphore() {
        let s = semaphore(0);
        let mut fence = Fence::create(1, &HostAllocator::system()).unwrap();

        fence.insert(&s, 1).unwrap();
        assert_eq!(s.ref_count(), 2);
        fence.insert(&s, 2).unwrap();
        assert_eq!(s.ref_count(), 2);

        drop(fence);
        assert_eq!(s.ref_count(), 1);
    }

    #[test]
    fn test_insert_over_capacity() {
        let semaphores: Vec<_> = (0..3).map(|_| semaphore(0)).collect();
        let mut fence = Fence::create(2, &HostAllocator::system()).unwrap();

        fence.insert(&semaphores[0], 1).unwrap();
        fence.insert(&semaphores[1], 2).unwrap();
        let err = fence.insert(&semaphores[2], 3).unwrap_err();

        assert_eq!(
            err,
            HalError::ResourceExhausted("fence unique semaphore capacity 2 reached".into())
        );
        assert_eq!(fence.len(), 2);
        assert_eq!(values(&fence), vec![1, 2]);
        assert_eq!(semaphores[2].ref_count(), 1);

        // Existing semaphores still merge at capacity.
        fence.insert(&semaphores[0], 4).unwrap();
        assert_eq!(values(&fence), vec![4, 2]);
    }

    #[test]
    fn test_insert_into_shared_fence_fails() {
        let s = semaphore(0);
        let mut fence = Fence::create(2, &HostAllocator::system()).unwrap();
        let shared = fence.clone();

        let err = fence.insert(&s, 1).unwrap_err();
        assert_eq!(err.code(), StatusCode::FailedPrecondition);
        assert!(fence.is_empty());

        drop(shared);
        assert!(fence.is_unique());
        fence.insert(&s, 1).unwrap();
        assert_eq!(fence.len(), 1);
    }

    #[test]
    fn test_create_at() {
        let s = semaphore(0);
        let fence = Fence::create_at(&s, 12, &HostAllocator::system()).unwrap();

        assert_eq!(fence.capacity(), 1);
        assert_eq!(fence.semaphore_list().value_of(&s), Some(12));
    }

    #[test]
    fn test_from_timepoints_dedups_and_sizes_exactly() {
        let a = semaphore(0);
        let b = semaphore(0);
        let fence = Fence::from_timepoints([(&a, 3), (&b, 1), (&a, 8)], &HostAllocator::system())
            .unwrap()
            .unwrap();

        assert_eq!(fence.capacity(), 2);
        assert_eq!(fence.semaphore_list().semaphores(), &[a, b]);
        assert_eq!(values(&fence), vec![8, 1]);
    }

    #[test]
    fn test_from_timepoints_empty_is_absent() {
        let none: [(&SemaphoreRef, u64); 0] = [];
        let fence = Fence::from_timepoints(none, &HostAllocator::system()).unwrap();
        assert!(fence.is_none());
    }

    #[test]
    fn test_join_merges_in_first_seen_order() {
        let allocator = HostAllocator::system();
        let (s1, s2, s3) = (semaphore(0), semaphore(0), semaphore(0));

        let a = Fence::from_timepoints([(&s1, 5), (&s2, 3)], &allocator)
            .unwrap()
            .unwrap();
        let b = Fence::from_timepoints([(&s1, 7), (&s3, 2)], &allocator)
            .unwrap()
            .unwrap();

        let joined = Fence::join([Some(&a), Some(&b)], &allocator)
            .unwrap()
            .unwrap();
        assert_eq!(joined.capacity(), 4);
        assert_eq!(
            joined.semaphore_list().semaphores(),
            &[s1.clone(), s2.clone(), s3.clone()]
        );
        assert_eq!(values(&joined), vec![7, 3, 2]);

        // Inputs are untouched.
        assert_eq!(values(&a), vec![5, 3]);
        assert_eq!(values(&b), vec![7, 2]);
    }

    #[test]
    fn test_join_exact_strategy() {
        let allocator = HostAllocator::system();
        let (s1, s2) = (semaphore(0), semaphore(0));

        let a = Fence::from_timepoints([(&s1, 1), (&s2, 1)], &allocator)
            .unwrap()
            .unwrap();
        let b = Fence::from_timepoints([(&s2, 4), (&s1, 2)], &allocator)
            .unwrap()
            .unwrap();

        let joined = Fence::join_with([Some(&a), Some(&b)], &allocator, JoinStrategy::Exact)
            .unwrap()
            .unwrap();
        assert_eq!(joined.capacity(), 2);
        assert_eq!(values(&joined), vec![2, 4]);
    }

    #[test]
    fn test_join_absent_inputs() {
        let allocator = HostAllocator::system();
        let none: [Option<&Fence>; 0] = [];
        assert!(Fence::join(none, &allocator).unwrap().is_none());
        assert!(Fence::join([None, None], &allocator).unwrap().is_none());

        let empty = Fence::create(3, &allocator).unwrap();
        assert!(
            Fence::join([Some(&empty), None], &allocator)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_join_skips_repeated_fence() {
        let allocator = HostAllocator::system();
        let s = semaphore(0);
        let a = Fence::create_at(&s, 4, &allocator).unwrap();
        let alias = a.clone();

        let joined = Fence::join([Some(&a), None, Some(&alias)], &allocator)
            .unwrap()
            .unwrap();
        assert_eq!(joined.capacity(), 1);
        assert_eq!(values(&joined), vec![4]);
    }

    #[test]
    fn test_join_worst_case_over_limit() {
        let allocator = HostAllocator::system();
        let s = semaphore(0);
        let fences: Vec<_> = (0..MAX_FENCE_CAPACITY as u64)
            .map(|value| Fence::create_at(&s, value, &allocator).unwrap())
            .collect();

        // The summed counts exceed the capacity limit even though every
        // fence references the same semaphore; exact sizing still fits.
        let err = Fence::join(fences.iter().map(Some), &allocator).unwrap_err();
        assert_eq!(err.code(), StatusCode::ResourceExhausted);

        let joined = Fence::join_with(fences.iter().map(Some), &allocator, JoinStrategy::Exact)
            .unwrap()
            .unwrap();
        assert_eq!(joined.capacity(), 1);
        assert_eq!(values(&joined), vec![MAX_FENCE_CAPACITY as u64 - 1]);
    }

    #[test]
    fn test_signal_in_order() {
        let (s1, s2) = (semaphore(0), semaphore(0));
        let fence = Fence::from_timepoints([(&s1, 5), (&s2, 9)], &HostAllocator::system())
            .unwrap()
            .unwrap();

        fence.signal().unwrap();
        assert_eq!(s1.query().unwrap(), 5);
        assert_eq!(s2.query().unwrap(), 9);
        assert!(fence.query().unwrap());
    }

    #[test]
    fn test_signal_stops_at_first_failure() {
        let (s1, s2, s3) = (semaphore(0), semaphore(10), semaphore(0));
        let fence = Fence::from_timepoints([(&s1, 5), (&s2, 9), (&s3, 1)], &HostAllocator::system())
            .unwrap()
            .unwrap();

        let err = fence.signal().unwrap_err();
        assert_eq!(err.code(), StatusCode::FailedPrecondition);
        assert_eq!(s1.query().unwrap(), 5);
        assert_eq!(s2.query().unwrap(), 10);
        assert_eq!(s3.query().unwrap(), 0);
    }

    #[test]
    fn test_fail_reaches_every_semaphore() {
        let (s1, s2) = (semaphore(0), semaphore(0));
        let fence = Fence::from_timepoints([(&s1, 1), (&s2, 1)], &HostAllocator::system())
            .unwrap()
            .unwrap();

        fence.fail(Status::aborted("kernel fault"));

        let expected = HalError::PropagatedFailure(Status::aborted("kernel fault"));
        assert_eq!(s1.query().unwrap_err(), expected);
        assert_eq!(s2.query().unwrap_err(), expected);
        assert_eq!(fence.query().unwrap_err(), expected);
        assert_eq!(fence.wait(Timeout::Infinite).unwrap_err(), expected);
    }

    #[test]
    fn test_fail_empty_fence_drops_status() {
        let fence = Fence::create(1, &HostAllocator::system()).unwrap();
        fence.fail(Status::aborted("nobody listens"));
        assert!(fence.query().unwrap());
    }

    #[test]
    fn test_query_partial() {
        let (s1, s2) = (semaphore(0), semaphore(0));
        let fence = Fence::from_timepoints([(&s1, 1), (&s2, 2)], &HostAllocator::system())
            .unwrap()
            .unwrap();

        assert!(!fence.query().unwrap());
        s1.signal(1).unwrap();
        assert!(!fence.query().unwrap());
        s2.signal(3).unwrap();
        assert!(fence.query().unwrap());
    }

    #[test]
    fn test_wait_timeout() {
        let s = semaphore(0);
        let fence = Fence::create_at(&s, 1, &HostAllocator::system()).unwrap();

        assert_eq!(
            fence.wait(Timeout::Immediate).unwrap_err(),
            HalError::DeadlineExceeded
        );
    }

    #[test]
    fn test_wait_across_threads() {
        let shared = Arc::new(TimelineSemaphore::new(0));
        let s = SemaphoreRef::from(shared.clone());
        let fence = Fence::create_at(&s, 3, &HostAllocator::system()).unwrap();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            shared.signal(3).unwrap();
        });

        fence.wait(Timeout::Infinite).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_absent_fence_operations() {
        assert!(signal(None).is_ok());
        fail(None, Status::internal("dropped"));
        assert!(wait(None, Timeout::Immediate).is_ok());
        assert!(query(None).unwrap());

        let list = semaphore_list(None);
        assert_eq!(list.len(), 0);
        assert!(list.semaphores().is_empty());
        assert!(list.values().is_empty());
    }

    #[test]
    fn test_clone_shares_storage() {
        let s = semaphore(0);
        let fence = Fence::create_at(&s, 1, &HostAllocator::system()).unwrap();
        let clone = fence.clone();

        assert!(Fence::ptr_eq(&fence, &clone));
        assert_eq!(fence.ref_count(), 2);
        assert_eq!(s.ref_count(), 2);

        drop(fence);
        assert_eq!(clone.ref_count(), 1);
        assert_eq!(s.ref_count(), 2);

        drop(clone);
        assert_eq!(s.ref_count(), 1);
    }

    #[test]
    fn test_debug_output() {
        let s = SemaphoreRef::new(TimelineSemaphore::new(0).with_label("dispatch"));
        let fence = Fence::create_at(&s, 6, &HostAllocator::system()).unwrap();

        let debug = format!("{fence:?}");
        assert!(debug.contains("capacity: 1"));
        assert!(debug.contains("dispatch"));
    }
}
