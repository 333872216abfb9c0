//! # Vela Core
//!
//! Host-side utilities shared by the Vela device runtime:
//!
//! - [`status`] - Failure codes and the cloneable [`Status`](status::Status) payload
//! - [`allocator`] - Injected host allocation ([`HostAllocator`](allocator::HostAllocator))
//! - [`profiling`] - Optional Tracy instrumentation

pub mod allocator;
pub mod profiling;
pub mod status;

pub use allocator::{AllocError, Allocator, HostAllocator, SystemAllocator};
pub use status::{Status, StatusCode};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
