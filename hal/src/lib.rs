//! # Vela HAL
//!
//! Host-side synchronization for the Vela device runtime.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Semaphore`] - Interface to timeline semaphores supplied by device backends
//! - [`SemaphoreRef`] - Reference-counted semaphore handle compared by identity
//! - [`TimelineSemaphore`] - Host-memory timeline semaphore
//! - [`Fence`] - Joined set of semaphore timepoints, signaled, failed or
//!   waited on as a unit
//! - [`wait`] - Waiting on several fences at once
//!
//! ## Example
//!
//! ```
//! use vela_core::{HostAllocator, Status};
//! use vela_hal::{Fence, SemaphoreRef, TimelineSemaphore};
//!
//! let allocator = HostAllocator::system();
//! let queue = SemaphoreRef::new(TimelineSemaphore::new(0).with_label("queue"));
//!
//! let mut fence = Fence::create(4, &allocator).unwrap();
//! fence.insert(&queue, 1).unwrap();
//!
//! // Hand the frozen fence to the submission; report completion or failure.
//! let submitted = fence.clone();
//! if let Err(err) = submitted.signal() {
//!     submitted.fail(Status::from(err));
//! }
//! assert!(fence.query().unwrap());
//! ```

pub mod error;
pub mod fence;
pub mod semaphore;
pub mod timeline;
pub mod wait;

// Re-export main types for convenience
pub use error::{HalError, HalResult};
pub use fence::{Fence, JoinStrategy, MAX_FENCE_CAPACITY, SemaphoreList};
pub use semaphore::{Semaphore, SemaphoreRef, Timeout};
pub use timeline::TimelineSemaphore;
pub use wait::{wait_all, wait_any};

/// HAL library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
