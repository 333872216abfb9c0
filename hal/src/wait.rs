//! Waiting on several fences at once.
//!
//! [`wait_all`] blocks until every fence is reached; [`wait_any`] returns as
//! soon as one of them is. Both treat the absent fence as already reached.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use vela_core::profiling::profile_function;

use crate::error::{HalError, HalResult};
use crate::fence::Fence;
use crate::semaphore::Timeout;

/// First sleep between polls in [`wait_any`].
const MIN_POLL_INTERVAL: Duration = Duration::from_micros(50);
/// Upper bound on the sleep between polls in [`wait_any`].
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Block until every fence in `fences` is reached.
///
/// Absent fences and repeated occurrences of the same fence are skipped.
/// All waits share one deadline derived from `timeout`.
pub fn wait_all<'a>(
    fences: impl IntoIterator<Item = Option<&'a Fence>>,
    timeout: Timeout,
) -> HalResult<()> {
    profile_function!();
    let timeout = Timeout::from_deadline(timeout.deadline());
    let mut visited = HashSet::new();
    for fence in fences.into_iter().flatten() {
        if visited.insert(fence.as_ptr()) {
            fence.wait(timeout)?;
        }
    }
    Ok(())
}

/// Block until any fence in `fences` is reached.
///
/// Returns the index of the first reached fence, or `None` if `fences` is
/// empty. An absent or empty fence counts as reached. A failed semaphore in
/// any fence ends the wait with its failure.
pub fn wait_any(fences: &[Option<&Fence>], timeout: Timeout) -> HalResult<Option<usize>> {
    profile_function!();
    if fences.is_empty() {
        return Ok(None);
    }

    let deadline = timeout.deadline();
    let mut interval = MIN_POLL_INTERVAL;
    loop {
        for (index, fence) in fences.iter().enumerate() {
            if crate::fence::query(*fence)? {
                return Ok(Some(index));
            }
        }

        let mut sleep = interval;
        if let Some(deadline) = deadline {
            let now = Instant::now();
            if now >= deadline {
                return Err(HalError::DeadlineExceeded);
            }
            sleep = sleep.min(deadline - now);
        }
        std::thread::sleep(sleep);
        interval = (interval * 2).min(MAX_POLL_INTERVAL);
    }
}
