//! Single-allocation fence storage.
//!
//! A fence lives in one host allocation laid out as:
//!
//! ```text
//! +-------------+---------------------------------+----------------------+
//! | FenceHeader | SemaphoreRef semaphores[cap]    | u64 values[cap]      |
//! +-------------+---------------------------------+----------------------+
//! ```
//!
//! Each array starts at an offset aligned for its element type. Only the
//! first `count` slots of each array are initialized.

use std::alloc::Layout;
use std::ptr::{self, NonNull};
use std::slice;
use std::sync::atomic::{self, AtomicUsize, Ordering};

use vela_core::HostAllocator;

use crate::error::{HalError, HalResult};
use crate::semaphore::SemaphoreRef;

/// Exclusive upper bound on fence capacity.
pub const MAX_FENCE_CAPACITY: usize = u16::MAX as usize;

/// Guard against reference count overflow, same threshold as `std::sync::Arc`.
const MAX_REF_COUNT: usize = isize::MAX as usize;

struct FenceHeader {
    ref_count: AtomicUsize,
    allocator: HostAllocator,
    layout: Layout,
    semaphores_offset: usize,
    values_offset: usize,
    capacity: u16,
    count: u16,
}

/// Byte layout of a fence allocation for a given capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StorageLayout {
    pub layout: Layout,
    pub semaphores_offset: usize,
    pub values_offset: usize,
}

impl StorageLayout {
    pub fn for_capacity(capacity: usize) -> HalResult<Self> {
        let too_large = |_| {
            HalError::ResourceExhausted(format!(
                "capacity {capacity} is too large for fence storage"
            ))
        };
        let header = Layout::new::<FenceHeader>();
        let semaphores = Layout::array::<SemaphoreRef>(capacity).map_err(too_large)?;
        let values = Layout::array::<u64>(capacity).map_err(too_large)?;

        let (layout, semaphores_offset) = header.extend(semaphores).map_err(too_large)?;
        let (layout, values_offset) = layout.extend(values).map_err(too_large)?;

        Ok(Self {
            layout: layout.pad_to_align(),
            semaphores_offset,
            values_offset,
        })
    }
}

/// Untyped-lifetime pointer to a fence allocation.
///
/// `RawFence` performs no reference counting on its own; [`Fence`](super::Fence)
/// owns one reference per handle and decides when to destroy the storage.
#[derive(Clone, Copy)]
pub(crate) struct RawFence {
    ptr: NonNull<FenceHeader>,
}

impl RawFence {
    /// Allocate storage for `capacity` timepoints with a reference count of 1.
    pub fn allocate(capacity: usize, allocator: &HostAllocator) -> HalResult<Self> {
        if capacity >= MAX_FENCE_CAPACITY {
            return Err(HalError::ResourceExhausted(format!(
                "capacity {capacity} is too large for fence storage"
            )));
        }
        let storage = StorageLayout::for_capacity(capacity)?;
        let ptr = allocator.allocate(storage.layout)?.cast::<FenceHeader>();

        // SAFETY: `ptr` is a fresh allocation large enough and aligned for the
        // header, which sits at offset 0.
        unsafe {
            ptr.as_ptr().write(FenceHeader {
                ref_count: AtomicUsize::new(1),
                allocator: allocator.clone(),
                layout: storage.layout,
                semaphores_offset: storage.semaphores_offset,
                values_offset: storage.values_offset,
                capacity: capacity as u16,
                count: 0,
            });
        }
        Ok(Self { ptr })
    }

    pub fn as_ptr(&self) -> *const () {
        self.ptr.as_ptr().cast_const().cast()
    }

    fn header(&self) -> &FenceHeader {
        // SAFETY: the header is initialized for as long as any handle exists.
        unsafe { self.ptr.as_ref() }
    }

    fn base(&self) -> *mut u8 {
        self.ptr.as_ptr().cast::<u8>()
    }

    fn semaphores_ptr(&self) -> *mut SemaphoreRef {
        // SAFETY: the offset lies within the allocation.
        unsafe { self.base().add(self.header().semaphores_offset).cast() }
    }

    fn values_ptr(&self) -> *mut u64 {
        // SAFETY: the offset lies within the allocation.
        unsafe { self.base().add(self.header().values_offset).cast() }
    }

    pub fn capacity(&self) -> usize {
        self.header().capacity as usize
    }

    pub fn count(&self) -> usize {
        self.header().count as usize
    }

    pub fn allocation_size(&self) -> usize {
        self.header().layout.size()
    }

    pub fn allocator(&self) -> &HostAllocator {
        &self.header().allocator
    }

    pub fn ref_count(&self) -> usize {
        self.header().ref_count.load(Ordering::Acquire)
    }

    /// The initialized prefix of both arrays.
    pub fn timepoints(&self) -> (&[SemaphoreRef], &[u64]) {
        let count = self.count();
        // SAFETY: the first `count` slots of both arrays are initialized and
        // are only mutated through `&mut Fence` while no other handle exists.
        unsafe {
            (
                slice::from_raw_parts(self.semaphores_ptr(), count),
                slice::from_raw_parts(self.values_ptr(), count),
            )
        }
    }

    /// Raise the value stored at `index` to at least `value`.
    ///
    /// # Safety
    ///
    /// The caller must be the only holder and `index < count`.
    pub unsafe fn merge_value(&self, index: usize, value: u64) {
        debug_assert!(index < self.count());
        // SAFETY: guaranteed by the caller.
        unsafe {
            let slot = self.values_ptr().add(index);
            *slot = (*slot).max(value);
        }
    }

    /// Append a timepoint, taking ownership of `semaphore`.
    ///
    /// # Safety
    ///
    /// The caller must be the only holder and `count < capacity`.
    pub unsafe fn push(&self, semaphore: SemaphoreRef, value: u64) {
        let count = self.count();
        debug_assert!(count < self.capacity());
        // SAFETY: slot `count` is in bounds and uninitialized; no other handle
        // can observe the header while the count changes.
        unsafe {
            self.semaphores_ptr().add(count).write(semaphore);
            self.values_ptr().add(count).write(value);
            (*self.ptr.as_ptr()).count += 1;
        }
    }

    pub fn retain(&self) {
        let old = self.header().ref_count.fetch_add(1, Ordering::Relaxed);
        if old > MAX_REF_COUNT {
            std::process::abort();
        }
    }

    /// Drop one reference. Returns `true` if it was the last one.
    pub fn release(&self) -> bool {
        if self.header().ref_count.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        true
    }

    /// Release every stored semaphore and free the allocation.
    ///
    /// # Safety
    ///
    /// The reference count must have reached zero and the storage must not
    /// be used afterwards.
    pub unsafe fn destroy(self) {
        let count = self.count();
        // SAFETY: exclusive access per the caller; the first `count`
        // semaphore slots are initialized and each is dropped exactly once.
        // The header is moved out before the memory is returned.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.semaphores_ptr(), count));
            let FenceHeader {
                allocator, layout, ..
            } = self.ptr.as_ptr().read();
            allocator.deallocate(self.ptr.cast(), layout);
        }
    }
}
