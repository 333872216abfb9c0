//! Profiling support via Tracy.
//!
//! Optional instrumentation of runtime operations using the
//! [Tracy profiler](https://github.com/wolfpld/tracy). Profiling is enabled via
//! the `profiling` Cargo feature:
//!
//! ```toml
//! [dependencies]
//! vela-core = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! # Zones
//!
//! Runtime objects open a zone around every operation that touches more than
//! a handful of fields (fence creation, joins, signal and fail propagation):
//!
//! ```ignore
//! use vela_core::profiling::{profile_function, profile_scope};
//!
//! fn join_fences() {
//!     profile_function!();
//!
//!     {
//!         profile_scope!("insert_timepoints");
//!         // ...
//!     }
//! }
//! ```
//!
//! # Performance
//!
//! When profiling is disabled (the default), all macros compile to no-ops with
//! zero runtime overhead.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, span};

/// Create a profiling span for the current scope.
///
/// The span ends when the scope exits.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span for the entire function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Send a message to Tracy's message log.
///
/// Used to annotate zones with runtime data such as the status code a fence
/// was failed with.
///
/// ```ignore
/// profile_message!(status.code().as_str());
/// ```
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_message {
    ($msg:expr) => {
        if let Some(client) = $crate::profiling::Client::running() {
            client.message($msg, 0);
        }
    };
}

/// Send a message (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_message {
    ($msg:expr) => {
        let _ = $msg;
    };
}

/// Create a profiling span with a runtime-determined name.
///
/// Unlike [`profile_scope!`] which requires a string literal, this macro
/// accepts any `&str` expression, e.g. a semaphore's debug label.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope_dynamic {
    ($name:expr) => {
        let _profile_span = $crate::profiling::Client::running()
            .map(|c| c.span_alloc(Some($name), "", file!(), line!(), 0));
    };
}

/// Create a profiling span with a dynamic name (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope_dynamic {
    ($name:expr) => {
        let _ = $name;
    };
}

// Re-export macros at module level
pub use profile_function;
pub use profile_message;
pub use profile_scope;
pub use profile_scope_dynamic;
