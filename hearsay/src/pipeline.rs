use std::sync::Mutex;

#[derive(Debug)]
struct SlotState<T> {
    completed: bool,
    value: Option<T>,
}

/// A set-once cell for the terminal outcome of a pipeline stage.
///
/// Streaming stages have several code paths that can end the stage (reader
/// error, process exit, normal completion). Every terminal emission goes
/// through `try_complete`; only the first caller wins and all later attempts
/// are no-ops, so a stage can never report two outcomes for one request.
/// Completion is tracked separately from the stored value: taking the value
/// does not reopen the slot.
#[derive(Debug)]
pub struct CompletionSlot<T> {
    inner: Mutex<SlotState<T>>,
}

impl<T> CompletionSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SlotState {
                completed: false,
                value: None,
            }),
        }
    }

    /// Commit a terminal outcome. Returns true if this call won the slot,
    /// false if an outcome was already committed (the value is dropped).
    pub fn try_complete(&self, value: T) -> bool {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if state.completed {
            false
        } else {
            state.completed = true;
            state.value = Some(value);
            true
        }
    }

    /// Whether an outcome has been committed.
    pub fn is_complete(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .completed
    }

    /// Take the committed outcome. The slot stays complete afterwards, so a
    /// later `try_complete` still loses.
    pub fn take(&self) -> Option<T> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .value
            .take()
    }
}

impl<T> Default for CompletionSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_first_completion_wins() {
        let slot = CompletionSlot::new();
        assert!(slot.try_complete("first"));
        assert!(!slot.try_complete("second"));
        assert_eq!(slot.take(), Some("first"));
    }

    #[test]
    fn test_empty_slot_is_incomplete() {
        let slot: CompletionSlot<u32> = CompletionSlot::new();
        assert!(!slot.is_complete());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_take_does_not_reopen_slot() {
        let slot = CompletionSlot::new();
        assert!(slot.try_complete(1));
        assert_eq!(slot.take(), Some(1));

        assert!(slot.is_complete());
        assert!(!slot.try_complete(2));
        assert_eq!(slot.take(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_exactly_one_concurrent_completion() {
        let slot = Arc::new(CompletionSlot::new());

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let slot = Arc::clone(&slot);
                tokio::spawn(async move { slot.try_complete(i) })
            })
            .collect();

        let mut wins = 0;
        for task in tasks {
            if task.await.expect("task panicked") {
                wins += 1;
            }
        }

        assert_eq!(wins, 1);
        assert!(slot.is_complete());
        assert!(slot.take().is_some());
    }
}
