//! Host timeline semaphore.
//!
//! A [`Semaphore`] implementation living entirely in host memory. Backends
//! without native timeline semaphores, host-side queues and tests use it.

use std::fmt;

use parking_lot::{Condvar, Mutex};
use vela_core::Status;
use vela_core::profiling::profile_scope_dynamic;

use crate::error::{HalError, HalResult};
use crate::semaphore::{Semaphore, Timeout};

#[derive(Debug)]
struct TimelineState {
    value: u64,
    /// First failure delivered to the semaphore; sticky.
    failure: Option<Status>,
}

impl TimelineState {
    fn check(&self) -> HalResult<u64> {
        match &self.failure {
            Some(status) => Err(HalError::PropagatedFailure(status.clone())),
            None => Ok(self.value),
        }
    }
}

/// Host-backed timeline semaphore.
///
/// # Example
///
/// ```
/// use vela_hal::{Semaphore, TimelineSemaphore, Timeout};
///
/// let semaphore = TimelineSemaphore::new(0).with_label("upload");
/// semaphore.signal(4).unwrap();
/// semaphore.wait(3, Timeout::Immediate).unwrap();
/// assert_eq!(semaphore.query().unwrap(), 4);
/// ```
pub struct TimelineSemaphore {
    state: Mutex<TimelineState>,
    condvar: Condvar,
    label: Option<String>,
}

impl TimelineSemaphore {
    /// Create a semaphore with the given initial payload.
    pub fn new(initial_value: u64) -> Self {
        Self {
            state: Mutex::new(TimelineState {
                value: initial_value,
                failure: None,
            }),
            condvar: Condvar::new(),
            label: None,
        }
    }

    /// Attach a debug label used in log output.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("<unlabeled>")
    }

    /// Whether the semaphore has been failed.
    pub fn is_failed(&self) -> bool {
        self.state.lock().failure.is_some()
    }

    /// The failure status, if any.
    pub fn failure(&self) -> Option<Status> {
        self.state.lock().failure.clone()
    }
}

impl Semaphore for TimelineSemaphore {
    fn query(&self) -> HalResult<u64> {
        self.state.lock().check()
    }

    fn signal(&self, value: u64) -> HalResult<()> {
        let mut state = self.state.lock();
        let current = state.check()?;
        if value <= current {
            return Err(HalError::FailedPrecondition(format!(
                "semaphore '{}' must increase: current {current}, new {value}",
                self.label()
            )));
        }
        state.value = value;
        drop(state);

        log::trace!("Semaphore '{}' signaled to {}", self.label(), value);
        self.condvar.notify_all();
        Ok(())
    }

    fn fail(&self, status: Status) {
        let mut state = self.state.lock();
        if let Some(existing) = &state.failure {
            log::debug!(
                "Semaphore '{}' already failed with {}; dropping {}",
                self.label(),
                existing,
                status
            );
            return;
        }
        log::trace!("Semaphore '{}' failed: {}", self.label(), status);
        state.failure = Some(status);
        drop(state);

        self.condvar.notify_all();
    }

    fn wait(&self, value: u64, timeout: Timeout) -> HalResult<()> {
        profile_scope_dynamic!(self.label());
        let deadline = timeout.deadline();
        let mut state = self.state.lock();
        loop {
            if state.check()? >= value {
                return Ok(());
            }
            match deadline {
                None => self.condvar.wait(&mut state),
                Some(deadline) => {
                    if self.condvar.wait_until(&mut state, deadline).timed_out() {
                        // Re-check once: the value may have landed together with the timeout.
                        return if state.check()? >= value {
                            Ok(())
                        } else {
                            Err(HalError::DeadlineExceeded)
                        };
                    }
                }
            }
        }
    }
}

impl fmt::Debug for TimelineSemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TimelineSemaphore")
            .field("label", &self.label())
            .field("value", &state.value)
            .field("failure", &state.failure)
            .finish()
    }
}

static_assertions::assert_impl_all!(TimelineSemaphore: Send, Sync);
