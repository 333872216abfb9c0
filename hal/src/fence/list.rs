//! Borrowed view of a fence's timepoints.

use std::iter::{Copied, Zip};
use std::slice;

use crate::semaphore::SemaphoreRef;

/// Semaphores and their payload values, as stored in a fence.
///
/// The view borrows the fence's storage and does not retain the semaphores;
/// clone a [`SemaphoreRef`] out of it to keep one beyond the fence.
#[derive(Debug, Clone, Copy)]
pub struct SemaphoreList<'a> {
    semaphores: &'a [SemaphoreRef],
    values: &'a [u64],
}

impl<'a> SemaphoreList<'a> {
    pub(crate) fn new(semaphores: &'a [SemaphoreRef], values: &'a [u64]) -> Self {
        debug_assert_eq!(semaphores.len(), values.len());
        Self { semaphores, values }
    }

    /// The view of the absent fence.
    pub fn empty() -> Self {
        Self {
            semaphores: &[],
            values: &[],
        }
    }

    pub fn len(&self) -> usize {
        self.semaphores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.semaphores.is_empty()
    }

    pub fn semaphores(&self) -> &'a [SemaphoreRef] {
        self.semaphores
    }

    pub fn values(&self) -> &'a [u64] {
        self.values
    }

    /// Payload value recorded for `semaphore`, if present.
    pub fn value_of(&self, semaphore: &SemaphoreRef) -> Option<u64> {
        self.semaphores
            .iter()
            .position(|s| s.same(semaphore))
            .map(|index| self.values[index])
    }

    pub fn iter(&self) -> Iter<'a> {
        self.semaphores.iter().zip(self.values.iter().copied())
    }
}

impl Default for SemaphoreList<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Iterator over `(semaphore, value)` pairs in storage order.
pub type Iter<'a> = Zip<slice::Iter<'a, SemaphoreRef>, Copied<slice::Iter<'a, u64>>>;

impl<'a> IntoIterator for SemaphoreList<'a> {
    type Item = (&'a SemaphoreRef, u64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
