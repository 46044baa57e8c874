//! Index-addressed fan-out/fan-in.
//!
//! Results land in fixed slots by input index, so the joined order is the
//! input order no matter which sub-task finishes first. The first error is
//! latched; later errors are logged and dropped. Sub-tasks are never
//! cancelled: [`join_indexed`] waits for all of them before returning.

use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, warn};

use crate::error::{JobError, JobResult};

/// Per-fan-out context: result slots, completion counter, first-error latch.
#[derive(Debug)]
pub struct FanOut<T> {
    slots: Mutex<Vec<Option<T>>>,
    completed: AtomicUsize,
    first_error: OnceLock<(usize, JobError)>,
}

impl<T> FanOut<T> {
    pub fn new(size: usize) -> Self {
        Self {
            slots: Mutex::new((0..size).map(|_| None).collect()),
            completed: AtomicUsize::new(0),
            first_error: OnceLock::new(),
        }
    }

    /// Record the outcome of sub-task `index`.
    pub fn record(&self, index: usize, result: JobResult<T>) {
        match result {
            Ok(value) => {
                let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(value);
                }
            }
            Err(err) => {
                if let Err((index, err)) = self.first_error.set((index, err)) {
                    warn!(index = index, error = %err, "Additional sub-task failure after first error");
                } else {
                    warn!(index = index, "First sub-task failure latched");
                }
            }
        }
        let done = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(index = index, completed = done, "Sub-task finished");
    }

    /// Number of sub-tasks that have reported.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Index of the first failed sub-task, if any.
    pub fn failed_index(&self) -> Option<usize> {
        self.first_error.get().map(|(index, _)| *index)
    }

    /// Results in input order, or the latched error.
    pub fn into_ordered(self) -> JobResult<Vec<T>> {
        if let Some((_, err)) = self.first_error.into_inner() {
            return Err(err);
        }

        let slots = self.slots.into_inner().unwrap_or_else(|p| p.into_inner());
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    JobError::Io(std::io::Error::other(format!("sub-task {} never reported", index)))
                })
            })
            .collect()
    }
}

/// Launch `size` sub-tasks concurrently and wait for every one of them.
///
/// `task(i)` builds the future for input `i`. The returned context holds all
/// results; call [`FanOut::into_ordered`] to join them.
pub async fn join_indexed<T, F, Fut>(size: usize, mut task: F) -> FanOut<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = JobResult<T>>,
{
    let fanout = FanOut::new(size);
    let ctx = &fanout;

    let futures: Vec<_> = (0..size)
        .map(|index| {
            let fut = task(index);
            async move {
                let result = fut.await;
                ctx.record(index, result);
            }
        })
        .collect();

    join_all(futures).await;
    fanout
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let delays = [30u64, 0, 15];
        let fanout = join_indexed(3, |i| async move {
            tokio::time::sleep(Duration::from_millis(delays[i])).await;
            Ok(i * 10)
        })
        .await;

        assert_eq!(fanout.completed(), 3);
        assert_eq!(fanout.into_ordered().unwrap(), vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn test_first_error_wins_and_all_finish() {
        let fanout = join_indexed(3, |i| async move {
            tokio::time::sleep(Duration::from_millis(10 * (3 - i as u64))).await;
            if i == 0 || i == 1 {
                Err(JobError::download_failure(format!("input {}", i)))
            } else {
                Ok(i)
            }
        })
        .await;

        assert_eq!(fanout.completed(), 3);
        // Input 1 sleeps less than input 0, so it fails first
        assert_eq!(fanout.failed_index(), Some(1));
        let err = fanout.into_ordered().unwrap_err();
        assert_eq!(err.to_string(), "Download failure: input 1");
    }

    #[test]
    fn test_missing_slot_is_an_error() {
        let fanout: FanOut<u8> = FanOut::new(2);
        fanout.record(0, Ok(1));
        assert!(fanout.into_ordered().is_err());
    }
}
