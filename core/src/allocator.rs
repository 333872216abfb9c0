//! Injected host memory allocation.
//!
//! Runtime objects that carve their storage out of a single block (fences,
//! command lists, ...) take a [`HostAllocator`] instead of reaching for the
//! global allocator directly. This lets embedders route host allocations
//! through their own arenas and lets tests observe and fail allocations.
//!
//! # Example
//!
//! ```
//! use std::alloc::Layout;
//! use vela_core::allocator::HostAllocator;
//!
//! let allocator = HostAllocator::system();
//! let layout = Layout::from_size_align(64, 8).unwrap();
//! let ptr = allocator.allocate(layout).unwrap();
//! // SAFETY: `ptr` was returned by `allocate` with the same layout.
//! unsafe { allocator.deallocate(ptr, layout) };
//! ```

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

/// Host memory could not be allocated for the requested layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    /// Requested size in bytes.
    pub size: usize,
    /// Requested alignment in bytes.
    pub align: usize,
}

impl AllocError {
    pub fn for_layout(layout: Layout) -> Self {
        Self {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate {} bytes (align {})",
            self.size, self.align
        )
    }
}

impl std::error::Error for AllocError {}

/// Host memory allocator interface.
///
/// Implementations must be callable from any thread.
pub trait Allocator: Send + Sync {
    /// Allocate a block of memory fitting `layout`.
    ///
    /// The returned memory is uninitialized.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block previously obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with the
    /// same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Debug name of the allocator.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Allocator backed by the process global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Err(AllocError::for_layout(layout));
        }
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| AllocError::for_layout(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: guaranteed by the caller.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Shared handle to an [`Allocator`].
///
/// Objects that allocate from a `HostAllocator` keep a clone of it so their
/// storage is returned to the same allocator when they are destroyed.
#[derive(Clone)]
pub struct HostAllocator {
    inner: Arc<dyn Allocator>,
}

impl HostAllocator {
    /// Wrap an injected allocator.
    pub fn new(allocator: impl Allocator + 'static) -> Self {
        Self {
            inner: Arc::new(allocator),
        }
    }

    /// Wrap an already shared allocator.
    pub fn from_arc(allocator: Arc<dyn Allocator>) -> Self {
        Self { inner: allocator }
    }

    /// The process global allocator.
    pub fn system() -> Self {
        Self::new(SystemAllocator)
    }

    /// Allocate a block of memory fitting `layout`.
    ///
    /// Zero-sized layouts are rejected.
    pub fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Err(AllocError::for_layout(layout));
        }
        self.inner.allocate(layout).inspect_err(|err| {
            log::warn!("Host allocator '{}': {}", self.name(), err);
        })
    }

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// See [`Allocator::deallocate`].
    pub unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: guaranteed by the caller.
        unsafe { self.inner.deallocate(ptr, layout) }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

impl Default for HostAllocator {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for HostAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostAllocator")
            .field("name", &self.name())
            .finish()
    }
}

static_assertions::assert_impl_all!(HostAllocator: Send, Sync);
