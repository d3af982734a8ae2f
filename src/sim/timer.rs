//! Cancellable deferred actions on a virtual millisecond clock
//!
//! Every armed action carries the epoch it was armed under. Owners bump
//! their epoch when they tear down, so an action that somehow outlives its
//! session can be recognised and dropped when it comes due.

use std::collections::BTreeMap;

/// Handle to an armed action. Ordered by due time, then by arm order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle {
    due: u64,
    seq: u64,
}

impl TimerHandle {
    /// Clock time (ms) at which the action fires
    pub fn due(&self) -> u64 {
        self.due
    }
}

/// An action popped from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    pub epoch: u64,
    pub action: T,
}

/// Pending actions, fired in `(due, seq)` order
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    pending: BTreeMap<TimerHandle, (u64, T)>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Arm `action` to fire at `due`
    pub fn arm(&mut self, due: u64, epoch: u64, action: T) -> TimerHandle {
        let handle = TimerHandle {
            due,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(handle, (epoch, action));
        handle
    }

    /// Cancel an armed action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Due time of the earliest pending action
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|h| h.due)
    }

    /// Pop the earliest action if it is due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<Fired<T>> {
        if self.next_due()? > now {
            return None;
        }
        let (handle, (epoch, action)) = self.pending.pop_first()?;
        Some(Fired {
            handle,
            epoch,
            action,
        })
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_then_arm_order() {
        let mut queue = TimerQueue::new();
        queue.arm(300, 0, "late");
        queue.arm(100, 0, "first");
        queue.arm(100, 0, "second");

        assert!(queue.pop_due(99).is_none());
        assert_eq!(queue.pop_due(1000).map(|f| f.action), Some("first"));
        assert_eq!(queue.pop_due(1000).map(|f| f.action), Some("second"));
        assert_eq!(queue.pop_due(1000).map(|f| f.action), Some("late"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut queue = TimerQueue::new();
        let handle = queue.arm(50, 0, ());
        assert!(queue.is_armed(handle));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(queue.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn test_fired_carries_epoch() {
        let mut queue = TimerQueue::new();
        queue.arm(10, 7, 'x');
        let fired = queue.pop_due(10).unwrap();
        assert_eq!(fired.epoch, 7);
        assert_eq!(fired.handle.due(), 10);
    }
}
